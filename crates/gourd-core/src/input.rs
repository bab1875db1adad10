//! Explicit input-state context shared by the live game loop, the
//! recorder, and the replay engines.
//!
//! Replaces a process-global input singleton: the owner of the tick
//! loop constructs one [`InputContext`] and passes it to whoever needs
//! to read or inject key state, so tests can drive synthetic input
//! streams without global state.

use std::collections::HashSet;

use crate::id::KeyCode;

/// Mutable key state for one tick loop.
///
/// Tracks the currently-pressed set plus edge sets (keys that went
/// down or up since [`begin_tick`](InputContext::begin_tick)). Replay
/// engines inject recorded edges through [`press`](InputContext::press)
/// and [`release`](InputContext::release) exactly as a live keyboard
/// handler would.
///
/// # Examples
///
/// ```
/// use gourd_core::{InputContext, KeyCode};
///
/// let mut input = InputContext::new();
/// input.press(KeyCode::RIGHT);
/// assert!(input.is_pressed(KeyCode::RIGHT));
/// assert!(input.was_just_pressed(KeyCode::RIGHT));
///
/// input.begin_tick();
/// assert!(input.is_pressed(KeyCode::RIGHT));
/// assert!(!input.was_just_pressed(KeyCode::RIGHT));
/// ```
#[derive(Clone, Debug, Default)]
pub struct InputContext {
    pressed: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
    just_released: HashSet<KeyCode>,
}

impl InputContext {
    /// An empty context with no keys down.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the per-tick edge sets. Call once at the top of each tick,
    /// before new events are injected.
    pub fn begin_tick(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Register a key-down event.
    pub fn press(&mut self, key: KeyCode) {
        if self.pressed.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    /// Register a key-up event.
    pub fn release(&mut self, key: KeyCode) {
        if self.pressed.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Whether the key is currently held down.
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    /// Whether the key went down since the last `begin_tick`.
    pub fn was_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Copy of the currently-pressed set.
    ///
    /// The recorder diffs consecutive snapshots to produce edge events;
    /// the copy keeps the recorder free of aliasing with the live set.
    pub fn pressed_snapshot(&self) -> HashSet<KeyCode> {
        self.pressed.clone()
    }

    /// Release every held key. Used when a session ends mid-press so
    /// stale key state cannot leak into the next scene.
    pub fn clear(&mut self) {
        for key in self.pressed.drain() {
            self.just_released.insert(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_release_edges() {
        let mut input = InputContext::new();
        input.press(KeyCode::LEFT);
        input.press(KeyCode::LEFT); // repeat does not re-edge
        assert!(input.was_just_pressed(KeyCode::LEFT));

        input.begin_tick();
        input.release(KeyCode::LEFT);
        assert!(!input.is_pressed(KeyCode::LEFT));
        assert!(!input.was_just_pressed(KeyCode::LEFT));
    }

    #[test]
    fn release_without_press_is_noop() {
        let mut input = InputContext::new();
        input.release(KeyCode::UP);
        assert!(input.pressed_snapshot().is_empty());
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut input = InputContext::new();
        input.press(KeyCode::W);
        let snap = input.pressed_snapshot();
        input.release(KeyCode::W);
        assert!(snap.contains(&KeyCode::W));
        assert!(!input.is_pressed(KeyCode::W));
    }
}
