//! Exact re-simulation of a seeded recording.
//!
//! The engine does not move entities itself. It feeds the recorded
//! input edges and spawn events to a fresh simulation built from the
//! recorded seed, then lets the simulation's own step reproduce the
//! run. Recorded destroy events are never applied: consumption must
//! re-emerge from the step, and the recorded data is only used to
//! cross-check that it did.

use std::collections::HashMap;

use gourd_core::{EntityId, GridPos, InputContext, TimelinePayload};
use gourd_log::ReplayLog;

use crate::sim::Simulation;

/// Slack when deciding whether a recorded event is due: an event with
/// `t <= clock + TIME_EPS` dispatches this tick. Absorbs quantization
/// of recorded timestamps against the tick grid.
pub const TIME_EPS: f64 = 1e-3;

/// How far a consumption may land from its recorded destroy time
/// before it is flagged.
const DESTROY_TOLERANCE: f64 = 0.25;

/// A disagreement between the re-simulated run and the recorded one.
///
/// Diagnostics only: playback continues, and the caller decides how
/// loudly to surface them.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplayMismatch {
    /// Replay clock when the mismatch was detected.
    pub clock: f64,
    /// The entity involved.
    pub id: EntityId,
    /// What disagreed.
    pub kind: MismatchKind,
}

/// The kind of disagreement in a [`ReplayMismatch`].
#[derive(Clone, Debug, PartialEq)]
pub enum MismatchKind {
    /// The simulation consumed an entity the log never spawned.
    UnrecordedEntity,
    /// Consumed at a different grid cell than the recorded spawn.
    PositionDiverged {
        /// Cell the log says the entity spawned in.
        recorded: GridPos,
        /// Cell the simulation consumed it at.
        consumed: GridPos,
    },
    /// Consumed far from the recorded destroy time.
    TimeDiverged {
        /// Recorded destroy timestamp.
        recorded: f64,
        /// Replay clock at actual consumption.
        consumed: f64,
    },
    /// Consumed, but the log never recorded a destroy for this id.
    NoRecordedDestroy,
}

struct RecordedLifecycle {
    spawn_pos: Option<GridPos>,
    destroy_t: Option<f64>,
}

/// Drives a [`Simulation`] through a recorded run and verifies that
/// consumption matches the recorded timeline.
///
/// Construct with a simulation freshly built from the log's seed; the
/// engine assumes the simulation has consumed no randomness yet.
pub struct DeterministicReplay<S: Simulation> {
    log: ReplayLog,
    sim: S,
    clock: f64,
    next_input: usize,
    next_event: usize,
    recorded: HashMap<EntityId, RecordedLifecycle>,
    mismatches: Vec<ReplayMismatch>,
}

impl<S: Simulation> DeterministicReplay<S> {
    /// An engine over a normalized log. The verification table is
    /// built up front from the full timeline, so late destroy records
    /// still verify early consumptions.
    pub fn new(log: ReplayLog, sim: S) -> Self {
        let mut recorded: HashMap<EntityId, RecordedLifecycle> = HashMap::new();
        for event in &log.timeline {
            let entry = recorded
                .entry(event.id.clone())
                .or_insert(RecordedLifecycle {
                    spawn_pos: None,
                    destroy_t: None,
                });
            match &event.payload {
                TimelinePayload::Spawn { pos, .. } => entry.spawn_pos = Some(*pos),
                TimelinePayload::Destroy => entry.destroy_t = Some(event.t),
            }
        }
        Self {
            log,
            sim,
            clock: 0.0,
            next_input: 0,
            next_event: 0,
            recorded,
            mismatches: Vec::new(),
        }
    }

    /// Advance one tick: dispatch due recorded events, step the
    /// simulation, verify what it consumed.
    pub fn tick(&mut self, dt: f64, input: &mut InputContext) {
        self.clock += dt;
        let due = self.clock + TIME_EPS;

        input.begin_tick();
        while self.next_input < self.log.inputs.len() && self.log.inputs[self.next_input].t <= due {
            let event = &self.log.inputs[self.next_input];
            for &key in &event.keys {
                if event.is_release() {
                    input.release(key);
                } else {
                    input.press(key);
                }
            }
            self.next_input += 1;
        }

        while self.next_event < self.log.timeline.len()
            && self.log.timeline[self.next_event].t <= due
        {
            let event = &self.log.timeline[self.next_event];
            // Spawns are authoritative; destroys stay verification-only.
            if event.is_spawn() {
                self.sim.apply_spawn(event);
            }
            self.next_event += 1;
        }

        self.sim.advance(dt, input);
        self.verify_consumed();
    }

    fn verify_consumed(&mut self) {
        for consumed in self.sim.drain_consumed() {
            let Some(recorded) = self.recorded.get(&consumed.id) else {
                self.push_mismatch(consumed.id, MismatchKind::UnrecordedEntity);
                continue;
            };

            if let Some(spawn_pos) = recorded.spawn_pos {
                if spawn_pos != consumed.pos {
                    let kind = MismatchKind::PositionDiverged {
                        recorded: spawn_pos,
                        consumed: consumed.pos,
                    };
                    self.push_mismatch(consumed.id, kind);
                    continue;
                }
            }

            match recorded.destroy_t {
                Some(t) if (t - self.clock).abs() > DESTROY_TOLERANCE => {
                    let kind = MismatchKind::TimeDiverged {
                        recorded: t,
                        consumed: self.clock,
                    };
                    self.push_mismatch(consumed.id, kind);
                }
                Some(_) => {}
                None => self.push_mismatch(consumed.id, MismatchKind::NoRecordedDestroy),
            }
        }
    }

    fn push_mismatch(&mut self, id: EntityId, kind: MismatchKind) {
        log::warn!("replay divergence at t={:.3}: {id} {kind:?}", self.clock);
        self.mismatches.push(ReplayMismatch {
            clock: self.clock,
            id,
            kind,
        });
    }

    /// Current replay clock in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// All divergences detected so far, in detection order.
    pub fn mismatches(&self) -> &[ReplayMismatch] {
        &self.mismatches
    }

    /// Whether every recorded event has been dispatched and the clock
    /// has passed the last keyframe.
    pub fn is_finished(&self) -> bool {
        self.next_input >= self.log.inputs.len()
            && self.next_event >= self.log.timeline.len()
            && self.clock >= self.log.duration()
    }

    /// The driven simulation.
    pub fn sim(&self) -> &S {
        &self.sim
    }

    /// Mutable access, for hosts that render simulation state.
    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ConsumedEntity;
    use gourd_core::{InputAction, InputEvent, KeyCode, TimelineEvent};
    use gourd_log::record::{encode_line, DestroyRecord, Record, SpawnRecord, SpawnedEntity};
    use smallvec::smallvec;

    /// Records every call the engine makes, and consumes scripted
    /// entities on scheduled ticks.
    #[derive(Default)]
    struct ScriptedSim {
        advanced: Vec<f64>,
        spawned: Vec<EntityId>,
        pressed_at_step: Vec<Vec<KeyCode>>,
        consume_on_step: HashMap<usize, ConsumedEntity>,
        outbox: Vec<ConsumedEntity>,
    }

    impl Simulation for ScriptedSim {
        fn advance(&mut self, dt: f64, input: &mut InputContext) {
            let step = self.advanced.len();
            self.advanced.push(dt);
            let mut held: Vec<KeyCode> = input
                .pressed_snapshot()
                .into_iter()
                .collect();
            held.sort_unstable();
            self.pressed_at_step.push(held);
            if let Some(consumed) = self.consume_on_step.remove(&step) {
                self.outbox.push(consumed);
            }
        }

        fn apply_spawn(&mut self, event: &TimelineEvent) {
            self.spawned.push(event.id.clone());
        }

        fn drain_consumed(&mut self) -> Vec<ConsumedEntity> {
            std::mem::take(&mut self.outbox)
        }

        fn reproducible_seed(&self) -> Option<u64> {
            Some(7)
        }
    }

    fn input_at(t: f64, action: InputAction, key: KeyCode) -> Record {
        Record::Input(InputEvent {
            t,
            action,
            keys: smallvec![key],
        })
    }

    fn spawn_at(t: f64, id: &str, x: i32, y: i32) -> Record {
        Record::Spawn(SpawnRecord {
            t,
            entity: SpawnedEntity {
                id: EntityId::from(id),
                kind: "seed".to_owned(),
                gx: x,
                gy: y,
                color: None,
            },
        })
    }

    fn destroy_at(t: f64, id: &str) -> Record {
        Record::Destroy(DestroyRecord {
            t,
            id: EntityId::from(id),
        })
    }

    fn log_with(records: Vec<Record>) -> ReplayLog {
        let lines: Vec<String> = records
            .iter()
            .map(|r| encode_line(r).unwrap())
            .collect();
        ReplayLog::from_lines(lines)
    }

    #[test]
    fn inputs_dispatch_in_order_before_the_step() {
        let log = log_with(vec![
            input_at(0.05, InputAction::Press, KeyCode::RIGHT),
            input_at(0.25, InputAction::Release, KeyCode::RIGHT),
        ]);
        let mut replay = DeterministicReplay::new(log, ScriptedSim::default());
        let mut input = InputContext::new();

        replay.tick(0.1, &mut input); // press due at clock 0.1
        replay.tick(0.1, &mut input); // nothing due
        replay.tick(0.1, &mut input); // release due at clock 0.3

        let sim = replay.sim();
        assert_eq!(sim.pressed_at_step[0], [KeyCode::RIGHT]);
        assert_eq!(sim.pressed_at_step[1], [KeyCode::RIGHT]);
        assert!(sim.pressed_at_step[2].is_empty());
    }

    #[test]
    fn epsilon_pulls_in_boundary_events() {
        // Recorded at 0.1004, clock reaches only 0.1: within TIME_EPS.
        let log = log_with(vec![input_at(0.1004, InputAction::Press, KeyCode::UP)]);
        let mut replay = DeterministicReplay::new(log, ScriptedSim::default());
        let mut input = InputContext::new();
        replay.tick(0.1, &mut input);
        assert_eq!(replay.sim().pressed_at_step[0], [KeyCode::UP]);
    }

    #[test]
    fn spawns_apply_but_destroys_do_not() {
        let log = log_with(vec![spawn_at(0.05, "seed0", 3, 4), destroy_at(0.15, "seed0")]);
        let mut replay = DeterministicReplay::new(log, ScriptedSim::default());
        let mut input = InputContext::new();
        replay.tick(0.1, &mut input);
        replay.tick(0.1, &mut input);

        assert_eq!(replay.sim().spawned, [EntityId::from("seed0")]);
        assert!(replay.is_finished());
    }

    #[test]
    fn matching_consumption_produces_no_mismatch() {
        let mut sim = ScriptedSim::default();
        sim.consume_on_step.insert(
            1,
            ConsumedEntity {
                id: EntityId::from("seed0"),
                pos: GridPos::new(3, 4),
            },
        );
        let log = log_with(vec![spawn_at(0.05, "seed0", 3, 4), destroy_at(0.2, "seed0")]);
        let mut replay = DeterministicReplay::new(log, sim);
        let mut input = InputContext::new();
        replay.tick(0.1, &mut input);
        replay.tick(0.1, &mut input);
        assert!(replay.mismatches().is_empty());
    }

    #[test]
    fn diverged_position_is_flagged_not_fatal() {
        let mut sim = ScriptedSim::default();
        sim.consume_on_step.insert(
            0,
            ConsumedEntity {
                id: EntityId::from("seed0"),
                pos: GridPos::new(9, 9),
            },
        );
        let log = log_with(vec![spawn_at(0.05, "seed0", 3, 4), destroy_at(0.1, "seed0")]);
        let mut replay = DeterministicReplay::new(log, sim);
        let mut input = InputContext::new();
        replay.tick(0.1, &mut input);

        assert_eq!(replay.mismatches().len(), 1);
        assert!(matches!(
            replay.mismatches()[0].kind,
            MismatchKind::PositionDiverged { .. }
        ));
        // Playback keeps going.
        replay.tick(0.1, &mut input);
        assert_eq!(replay.sim().advanced.len(), 2);
    }

    #[test]
    fn unrecorded_consumption_is_flagged() {
        let mut sim = ScriptedSim::default();
        sim.consume_on_step.insert(
            0,
            ConsumedEntity {
                id: EntityId::from("ghost"),
                pos: GridPos::new(1, 1),
            },
        );
        let mut replay = DeterministicReplay::new(log_with(Vec::new()), sim);
        let mut input = InputContext::new();
        replay.tick(0.1, &mut input);
        assert_eq!(
            replay.mismatches()[0].kind,
            MismatchKind::UnrecordedEntity
        );
    }
}
