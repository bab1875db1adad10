//! The collaborator contract between replay engines and a simulation.

use gourd_core::{EntityId, GridPos, InputContext, TimelineEvent};

/// An entity the simulation consumed during its last step, reported
/// with the grid cell it occupied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsumedEntity {
    /// Id of the consumed entity.
    pub id: EntityId,
    /// Grid cell it was consumed at.
    pub pos: GridPos,
}

/// A steppable simulation that a replay engine can drive.
///
/// The engine owns the pacing: it injects recorded input edges into
/// the [`InputContext`], applies due spawn events, then calls
/// [`advance`](Simulation::advance). The simulation reports what it
/// consumed through [`drain_consumed`](Simulation::drain_consumed) so
/// the engine can cross-check against the recorded timeline.
pub trait Simulation {
    /// Advance the simulation by `dt` seconds, reading key state from
    /// the provided input context.
    fn advance(&mut self, dt: f64, input: &mut InputContext);

    /// Authoritatively create a recorded entity. Only spawn payloads
    /// are passed here; the position and color come from the log, not
    /// from the simulation's own RNG.
    fn apply_spawn(&mut self, event: &TimelineEvent);

    /// Entities consumed since the previous drain, in consumption
    /// order. Draining resets the outbox.
    fn drain_consumed(&mut self) -> Vec<ConsumedEntity>;

    /// The seed this simulation can be reconstructed from, when it is
    /// deterministic. `None` means runs are not reproducible and only
    /// interpolated playback is meaningful.
    fn reproducible_seed(&self) -> Option<u64> {
        None
    }
}
