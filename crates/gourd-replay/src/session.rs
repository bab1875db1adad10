//! Browse-and-play session over a log store.
//!
//! The session owns only navigation and lifecycle state. Activating a
//! log hands back the loaded, normalized data tagged with a playback
//! mode; the host builds the engine (and, for deterministic playback,
//! the seeded simulation) itself.

use gourd_log::{LogError, LogStore, ReplayLog};

/// Where the session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Browsing the store's log list.
    Browsing,
    /// A log is loaded and playing.
    Playing,
    /// Playback ended; waiting for acknowledgement.
    Finished,
}

/// How an activated log should be played back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackMode {
    /// The header carried a seed: re-simulate exactly.
    Deterministic(u64),
    /// No seed: interpolate between keyframes.
    Interpolated,
}

/// A successfully activated log, ready to hand to an engine.
#[derive(Clone, Debug)]
pub struct ActivatedReplay {
    /// The normalized log.
    pub log: ReplayLog,
    /// Playback mode derived from the header.
    pub mode: PlaybackMode,
}

/// Selection and lifecycle over the logs in a store.
///
/// A failed load reports its error and leaves the session browsing,
/// so one corrupt recording never takes down the menu.
pub struct ReplaySession {
    names: Vec<String>,
    selected: usize,
    state: SessionState,
}

impl ReplaySession {
    /// A browsing session over the store's current log list.
    pub fn new(store: &dyn LogStore) -> Result<Self, LogError> {
        Ok(Self {
            names: store.list()?,
            selected: 0,
            state: SessionState::Browsing,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Available log names, oldest first.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The highlighted log name, if the list is non-empty.
    pub fn selected(&self) -> Option<&str> {
        self.names.get(self.selected).map(String::as_str)
    }

    /// Move the selection up, wrapping at the top.
    pub fn select_prev(&mut self) {
        if !self.names.is_empty() {
            self.selected = (self.selected + self.names.len() - 1) % self.names.len();
        }
    }

    /// Move the selection down, wrapping at the bottom.
    pub fn select_next(&mut self) {
        if !self.names.is_empty() {
            self.selected = (self.selected + 1) % self.names.len();
        }
    }

    /// Load the selected log and move to [`SessionState::Playing`].
    ///
    /// On any load failure the session stays browsing and the error is
    /// returned to the caller.
    pub fn activate(&mut self, store: &dyn LogStore) -> Result<ActivatedReplay, LogError> {
        let Some(name) = self.selected().map(str::to_owned) else {
            return Err(LogError::NotFound {
                name: "(empty list)".to_owned(),
            });
        };

        let log = ReplayLog::load(store, &name)?;
        if log.skipped_lines() > 0 {
            log::warn!("{name}: skipped {} malformed lines", log.skipped_lines());
        }
        let mode = match log.seed() {
            Some(seed) => PlaybackMode::Deterministic(seed),
            None => PlaybackMode::Interpolated,
        };

        self.state = SessionState::Playing;
        Ok(ActivatedReplay { log, mode })
    }

    /// Mark playback as ended. No-op unless playing.
    pub fn finish(&mut self) {
        if self.state == SessionState::Playing {
            self.state = SessionState::Finished;
        }
    }

    /// Acknowledge a finished playback and return to browsing with a
    /// refreshed log list.
    pub fn acknowledge(&mut self, store: &dyn LogStore) -> Result<(), LogError> {
        if self.state == SessionState::Finished {
            self.names = store.list()?;
            self.selected = self.selected.min(self.names.len().saturating_sub(1));
            self.state = SessionState::Browsing;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gourd_test_utils::MemoryStore;

    fn seeded_log_lines(seed: u64) -> Vec<String> {
        vec![
            format!("{{\"type\":\"header\",\"version\":1,\"w\":800,\"h\":600,\"seed\":{seed}}}"),
            "{\"type\":\"keyframe\",\"t\":0.5,\"entities\":[{\"id\":\"head\",\"x\":1.0,\"y\":2.0}]}"
                .to_owned(),
        ]
    }

    #[test]
    fn selection_wraps_both_ways() {
        let store = MemoryStore::new();
        store.insert("a", Vec::new());
        store.insert("b", Vec::new());
        store.insert("c", Vec::new());

        let mut session = ReplaySession::new(&store).unwrap();
        assert_eq!(session.selected(), Some("a"));
        session.select_prev();
        assert_eq!(session.selected(), Some("c"));
        session.select_next();
        session.select_next();
        assert_eq!(session.selected(), Some("b"));
    }

    #[test]
    fn seeded_header_selects_deterministic_mode() {
        let store = MemoryStore::new();
        store.insert("run", seeded_log_lines(42));

        let mut session = ReplaySession::new(&store).unwrap();
        let activated = session.activate(&store).unwrap();
        assert_eq!(activated.mode, PlaybackMode::Deterministic(42));
        assert_eq!(session.state(), SessionState::Playing);
    }

    #[test]
    fn seedless_header_falls_back_to_interpolated() {
        let store = MemoryStore::new();
        store.insert(
            "run",
            vec!["{\"type\":\"header\",\"version\":1,\"w\":800,\"h\":600}".to_owned()],
        );

        let mut session = ReplaySession::new(&store).unwrap();
        let activated = session.activate(&store).unwrap();
        assert_eq!(activated.mode, PlaybackMode::Interpolated);
    }

    #[test]
    fn failed_load_stays_browsing() {
        let store = MemoryStore::new();
        let mut session = ReplaySession::new(&store).unwrap();
        assert!(session.activate(&store).is_err());
        assert_eq!(session.state(), SessionState::Browsing);
    }

    #[test]
    fn lifecycle_roundtrip() {
        let store = MemoryStore::new();
        store.insert("run", seeded_log_lines(1));

        let mut session = ReplaySession::new(&store).unwrap();
        session.activate(&store).unwrap();
        session.finish();
        assert_eq!(session.state(), SessionState::Finished);

        store.insert("run-2", seeded_log_lines(2));
        session.acknowledge(&store).unwrap();
        assert_eq!(session.state(), SessionState::Browsing);
        assert_eq!(session.names(), ["run", "run-2"]);
    }

    #[test]
    fn finish_outside_playing_is_a_noop() {
        let store = MemoryStore::new();
        let mut session = ReplaySession::new(&store).unwrap();
        session.finish();
        assert_eq!(session.state(), SessionState::Browsing);
    }
}
