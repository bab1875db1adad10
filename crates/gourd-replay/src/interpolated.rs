//! Keyframe-interpolated playback for logs without a seed.
//!
//! No simulation runs here: displayed state is reconstructed purely
//! from the recorded keyframe stream. Chain segments replay their
//! grid-aligned gait via Manhattan interpolation; everything else
//! lerps per axis. Identity is reconciled between the bracketing
//! keyframes by id first, with index alignment as a fallback, and
//! entities that drop out of the stream linger for a short grace
//! period before removal.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use gourd_core::{EntityId, EntitySnapshot, InputContext, Keyframe};
use gourd_log::ReplayLog;

use crate::deterministic::TIME_EPS;
use crate::interp::{lerp, manhattan_lerp};

/// Seconds an entity missing from the later keyframe stays visible
/// before it is removed.
pub const DEFAULT_GRACE: f64 = 0.25;

/// Whether playback is still producing frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// The clock is inside the keyframe range.
    Playing,
    /// The clock passed the last keyframe (or the log had none).
    Finished,
}

/// Reconstructs entity positions by interpolating between the two
/// keyframes bracketing the playback clock.
///
/// # Examples
///
/// ```no_run
/// use gourd_core::InputContext;
/// use gourd_log::{FsLogStore, ReplayLog};
/// use gourd_replay::{InterpolatedReplay, PlaybackStatus};
///
/// let store = FsLogStore::new("recordings");
/// let log = ReplayLog::load(&store, "run-1").unwrap();
/// let mut replay = InterpolatedReplay::new(log);
/// let mut input = InputContext::new();
/// while replay.tick(1.0 / 60.0, &mut input) == PlaybackStatus::Playing {
///     for entity in replay.entities() {
///         // hand to the renderer
///         let _ = (entity.x, entity.y);
///     }
/// }
/// ```
pub struct InterpolatedReplay {
    log: ReplayLog,
    clock: f64,
    grace: f64,
    next_input: usize,
    entities: IndexMap<EntityId, EntitySnapshot>,
    pending_removals: HashMap<EntityId, f64>,
}

impl InterpolatedReplay {
    /// An engine over a normalized log with the default grace period.
    pub fn new(log: ReplayLog) -> Self {
        Self {
            log,
            clock: 0.0,
            grace: DEFAULT_GRACE,
            next_input: 0,
            entities: IndexMap::new(),
            pending_removals: HashMap::new(),
        }
    }

    /// Override the grace period. Zero removes dropped entities on the
    /// next tick.
    pub fn with_grace(mut self, grace: f64) -> Self {
        self.grace = grace.max(0.0);
        self
    }

    /// Advance the playback clock and rebuild displayed state.
    pub fn tick(&mut self, dt: f64, input: &mut InputContext) -> PlaybackStatus {
        self.clock += dt;
        self.dispatch_inputs(input);

        if self.log.keyframes.is_empty() {
            return PlaybackStatus::Finished;
        }

        let (a_idx, b_idx, alpha) = self.bracket();
        reconcile(
            &mut self.entities,
            &mut self.pending_removals,
            self.clock,
            self.grace,
            &self.log.keyframes[a_idx],
            &self.log.keyframes[b_idx],
            alpha,
        );

        if self.clock > self.log.duration() {
            PlaybackStatus::Finished
        } else {
            PlaybackStatus::Playing
        }
    }

    /// Recorded input edges re-dispatch at their normalized timestamps
    /// so a host can mirror what the player was pressing.
    fn dispatch_inputs(&mut self, input: &mut InputContext) {
        input.begin_tick();
        let due = self.clock + TIME_EPS;
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
    }

    /// Indices of the keyframes bracketing the clock, and the clamped
    /// factor between them. A degenerate interval yields `alpha = 0`.
    fn bracket(&self) -> (usize, usize, f64) {
        let frames = &self.log.keyframes;
        let after = frames.partition_point(|k| k.t <= self.clock);
        let a_idx = after.saturating_sub(1);
        let b_idx = after.min(frames.len() - 1);

        let span = frames[b_idx].t - frames[a_idx].t;
        let alpha = if span <= f64::EPSILON {
            0.0
        } else {
            ((self.clock - frames[a_idx].t) / span).clamp(0.0, 1.0)
        };
        (a_idx, b_idx, alpha)
    }

    /// Current playback clock in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Displayed entities in stable insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.entities.values()
    }

    /// The displayed snapshot for one id, if visible.
    pub fn entity(&self, id: &EntityId) -> Option<&EntitySnapshot> {
        self.entities.get(id)
    }
}

/// Rebuild displayed state from the bracketing pair `a`/`b` at factor
/// `alpha`, updating grace-removal bookkeeping in place.
fn reconcile(
    entities: &mut IndexMap<EntityId, EntitySnapshot>,
    pending_removals: &mut HashMap<EntityId, f64>,
    clock: f64,
    grace: f64,
    a: &Keyframe,
    b: &Keyframe,
    alpha: f64,
) {
    let mut next: Vec<EntitySnapshot> = Vec::with_capacity(b.entities.len());
    let mut used_a: HashSet<&EntityId> = HashSet::new();

    // Chain segments pair by chain order, not by exact id, so a chain
    // that grew or shrank between frames still animates.
    let a_chain = chain_ordered(a);
    let b_chain = chain_ordered(b);
    for (i, target) in b_chain.iter().enumerate() {
        let snapshot = match a_chain.get(i) {
            Some(source) => {
                used_a.insert(&source.id);
                let (x, y) = manhattan_lerp(source.x, source.y, target.x, target.y, alpha);
                positioned(target, x, y)
            }
            // Chain grew: the new tail appears at its target cell.
            None => (*target).clone(),
        };
        next.push(snapshot);
    }

    // Everything else matches by id, falling back to index alignment
    // among the leftovers of both frames.
    let mut a_unmatched: Vec<&EntitySnapshot> = Vec::new();
    let mut b_unmatched: Vec<&EntitySnapshot> = Vec::new();
    for source in free_entities(a) {
        if b.entity(&source.id).is_none() {
            a_unmatched.push(source);
        }
    }
    for target in free_entities(b) {
        match a.entity(&target.id) {
            Some(source) => {
                used_a.insert(&source.id);
                let x = lerp(source.x, target.x, alpha);
                let y = lerp(source.y, target.y, alpha);
                next.push(positioned(target, x, y));
            }
            None => b_unmatched.push(target),
        }
    }
    for (i, target) in b_unmatched.into_iter().enumerate() {
        match a_unmatched.get(i) {
            Some(source) => {
                used_a.insert(&source.id);
                let x = lerp(source.x, target.x, alpha);
                let y = lerp(source.y, target.y, alpha);
                next.push(positioned(target, x, y));
            }
            // New in b: created immediately at b's position.
            None => next.push(target.clone()),
        }
    }

    // Entities in a that b dropped hold their last position until the
    // grace deadline.
    for source in &a.entities {
        if !used_a.contains(&source.id) && !entities.contains_key(&source.id) {
            entities.insert(source.id.clone(), source.clone());
        }
    }

    let in_b: HashSet<&EntityId> = b.entities.iter().map(|e| &e.id).collect();
    for snapshot in next {
        // Reappearance cancels any scheduled removal (covers id reuse
        // across a gap).
        pending_removals.remove(&snapshot.id);
        entities.insert(snapshot.id.clone(), snapshot);
    }
    for id in entities.keys() {
        if !in_b.contains(id) && !pending_removals.contains_key(id) {
            pending_removals.insert(id.clone(), clock + grace);
        }
    }

    let expired: Vec<EntityId> = pending_removals
        .iter()
        .filter(|(_, &deadline)| clock >= deadline)
        .map(|(id, _)| id.clone())
        .collect();
    for id in expired {
        pending_removals.remove(&id);
        entities.shift_remove(&id);
    }
}

/// Chain segments of a keyframe in chain order.
fn chain_ordered(frame: &Keyframe) -> Vec<&EntitySnapshot> {
    let mut chain: Vec<(usize, &EntitySnapshot)> = frame
        .entities
        .iter()
        .filter_map(|e| e.id.chain_index().map(|i| (i, e)))
        .collect();
    chain.sort_by_key(|(i, _)| *i);
    chain.into_iter().map(|(_, e)| e).collect()
}

/// Non-chain entities of a keyframe, in keyframe order.
fn free_entities(frame: &Keyframe) -> Vec<&EntitySnapshot> {
    frame
        .entities
        .iter()
        .filter(|e| e.id.chain_index().is_none())
        .collect()
}

/// The target snapshot with an interpolated position.
fn positioned(target: &EntitySnapshot, x: f64, y: f64) -> EntitySnapshot {
    EntitySnapshot {
        x,
        y,
        ..target.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gourd_core::{InputAction, InputEvent, KeyCode};
    use gourd_log::record::{encode_line, Record};
    use smallvec::smallvec;

    fn keyframe(t: f64, entities: Vec<(&str, f64, f64)>) -> Record {
        Record::Keyframe(Keyframe {
            t,
            entities: entities
                .into_iter()
                .map(|(id, x, y)| EntitySnapshot::at(EntityId::from(id), x, y))
                .collect(),
        })
    }

    fn log_with(records: Vec<Record>) -> ReplayLog {
        let lines: Vec<String> = records
            .iter()
            .map(|r| encode_line(r).unwrap())
            .collect();
        ReplayLog::from_lines(lines)
    }

    fn pos_of(replay: &InterpolatedReplay, id: &str) -> (f64, f64) {
        let e = replay.entity(&EntityId::from(id)).expect("entity visible");
        (e.x, e.y)
    }

    #[test]
    fn chain_segment_walks_one_axis_at_a_time() {
        let log = log_with(vec![
            keyframe(0.0, vec![("seg0", 0.0, 0.0)]),
            keyframe(1.0, vec![("seg0", 3.0, 2.0)]),
        ]);
        let mut input = InputContext::new();

        let mut replay = InterpolatedReplay::new(log.clone());
        replay.tick(0.3, &mut input);
        let (x, y) = pos_of(&replay, "seg0");
        assert!((x - 1.5).abs() < 1e-9);
        assert_eq!(y, 0.0);

        let mut replay = InterpolatedReplay::new(log);
        replay.tick(0.8, &mut input);
        let (x, y) = pos_of(&replay, "seg0");
        assert_eq!(x, 3.0);
        assert!((y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn free_entity_lerps_per_axis() {
        let log = log_with(vec![
            keyframe(0.0, vec![("monster0", 0.0, 10.0)]),
            keyframe(1.0, vec![("monster0", 10.0, 0.0)]),
        ]);
        let mut input = InputContext::new();
        let mut replay = InterpolatedReplay::new(log);
        replay.tick(0.5, &mut input);
        assert_eq!(pos_of(&replay, "monster0"), (5.0, 5.0));
    }

    #[test]
    fn endpoints_reproduce_the_keyframes() {
        let log = log_with(vec![
            keyframe(0.0, vec![("head", 1.0, 2.0), ("seg0", 3.0, 4.0)]),
            keyframe(1.0, vec![("head", 9.0, 8.0), ("seg0", 7.0, 6.0)]),
        ]);
        let mut input = InputContext::new();
        let mut replay = InterpolatedReplay::new(log);
        replay.tick(1.0, &mut input);
        assert_eq!(pos_of(&replay, "head"), (9.0, 8.0));
        assert_eq!(pos_of(&replay, "seg0"), (7.0, 6.0));
    }

    #[test]
    fn chain_pairs_by_order_when_ids_shift() {
        // The whole body shifted forward one cell: seg1 in frame a
        // feeds seg0 in frame b by order, not by id.
        let log = log_with(vec![
            keyframe(0.0, vec![("seg0", 0.0, 0.0), ("seg1", 2.0, 0.0)]),
            keyframe(1.0, vec![("seg0", 2.0, 0.0)]),
        ]);
        let mut input = InputContext::new();
        let mut replay = InterpolatedReplay::new(log).with_grace(10.0);
        replay.tick(0.5, &mut input);
        assert_eq!(pos_of(&replay, "seg0"), (1.0, 0.0));
    }

    #[test]
    fn dropped_entity_lingers_then_removes_after_grace() {
        let log = log_with(vec![
            keyframe(0.0, vec![("seed0", 4.0, 4.0), ("head", 0.0, 0.0)]),
            keyframe(1.0, vec![("head", 1.0, 0.0)]),
        ]);
        let mut input = InputContext::new();
        let mut replay = InterpolatedReplay::new(log);

        replay.tick(0.1, &mut input); // scheduled at 0.1 + 0.25 = 0.35
        assert_eq!(pos_of(&replay, "seed0"), (4.0, 4.0));

        replay.tick(0.2, &mut input); // clock 0.3, still inside grace
        assert!(replay.entity(&EntityId::from("seed0")).is_some());

        replay.tick(0.1, &mut input); // clock 0.4, past the deadline
        assert!(replay.entity(&EntityId::from("seed0")).is_none());
    }

    #[test]
    fn reappearance_cancels_pending_removal() {
        let log = log_with(vec![
            keyframe(0.0, vec![("seed0", 4.0, 4.0), ("head", 0.0, 0.0)]),
            keyframe(0.2, vec![("head", 1.0, 0.0)]),
            keyframe(0.4, vec![("seed0", 4.0, 4.0), ("head", 2.0, 0.0)]),
        ]);
        let mut input = InputContext::new();
        let mut replay = InterpolatedReplay::new(log);

        replay.tick(0.1, &mut input); // absent from b: removal scheduled
        replay.tick(0.2, &mut input); // clock 0.3, b now contains seed0 again
        replay.tick(0.2, &mut input); // clock 0.5, past the old deadline
        assert!(replay.entity(&EntityId::from("seed0")).is_some());
    }

    #[test]
    fn new_entity_appears_immediately() {
        let log = log_with(vec![
            keyframe(0.0, vec![("head", 0.0, 0.0)]),
            keyframe(1.0, vec![("head", 1.0, 0.0), ("seed0", 8.0, 8.0)]),
        ]);
        let mut input = InputContext::new();
        let mut replay = InterpolatedReplay::new(log);
        replay.tick(0.1, &mut input);
        assert_eq!(pos_of(&replay, "seed0"), (8.0, 8.0));
    }

    #[test]
    fn inputs_redispatch_into_the_context() {
        let mut records = vec![
            keyframe(0.0, vec![("head", 0.0, 0.0)]),
            keyframe(1.0, vec![("head", 1.0, 0.0)]),
        ];
        records.push(Record::Input(InputEvent {
            t: 0.5,
            action: InputAction::Press,
            keys: smallvec![KeyCode::RIGHT],
        }));
        let mut input = InputContext::new();
        let mut replay = InterpolatedReplay::new(log_with(records));

        replay.tick(0.4, &mut input);
        assert!(!input.is_pressed(KeyCode::RIGHT));
        replay.tick(0.2, &mut input);
        assert!(input.is_pressed(KeyCode::RIGHT));
    }

    #[test]
    fn finishes_past_the_last_keyframe() {
        let log = log_with(vec![
            keyframe(0.0, vec![("head", 0.0, 0.0)]),
            keyframe(0.5, vec![("head", 1.0, 0.0)]),
        ]);
        let mut input = InputContext::new();
        let mut replay = InterpolatedReplay::new(log);
        assert_eq!(replay.tick(0.4, &mut input), PlaybackStatus::Playing);
        assert_eq!(replay.tick(0.2, &mut input), PlaybackStatus::Finished);
        // Terminal positions stay available for a final frame.
        assert_eq!(pos_of(&replay, "head"), (1.0, 0.0));
    }

    #[test]
    fn empty_log_finishes_immediately() {
        let mut input = InputContext::new();
        let mut replay = InterpolatedReplay::new(log_with(Vec::new()));
        assert_eq!(replay.tick(0.1, &mut input), PlaybackStatus::Finished);
    }
}
