//! Best-effort log loading and timestamp normalization.
//!
//! [`ReplayLog`] is the fully-read, immutable view a replay engine is
//! constructed from. Loading never fails on individual bad lines
//! (they are skipped and counted); only an unreadable store aborts
//! a load.

use gourd_core::{InputEvent, Keyframe, TimelineEvent};

use crate::error::LogError;
use crate::record::{decode_line, Header, Record};
use crate::storage::LogStore;

/// An immutable, timestamp-normalized recording.
///
/// All record streams are sorted by timestamp, and every timestamp is
/// shifted by the same offset so the first keyframe sits at exactly
/// `t = 0`; relative ordering and deltas between records are
/// unchanged. Replay engines hold no state beyond what is here.
#[derive(Clone, Debug, Default)]
pub struct ReplayLog {
    /// The header record, when the log carried one.
    pub header: Option<Header>,
    /// Keyframes in timestamp order.
    pub keyframes: Vec<Keyframe>,
    /// Input edges in timestamp order.
    pub inputs: Vec<InputEvent>,
    /// Spawn/destroy events in timestamp order.
    pub timeline: Vec<TimelineEvent>,
    skipped: usize,
}

impl ReplayLog {
    /// Parse raw lines into a normalized log.
    ///
    /// Lines that fail to decode are skipped (visible via
    /// [`skipped_lines`](Self::skipped_lines)); blank lines are
    /// ignored silently.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut log = ReplayLog::default();

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }
            match decode_line(line) {
                Ok(Record::Header(h)) => {
                    // First header wins; duplicates are recorder bugs
                    // but must not poison playback.
                    if log.header.is_none() {
                        log.header = Some(h);
                    }
                }
                Ok(Record::Keyframe(k)) => log.keyframes.push(k),
                Ok(Record::Input(i)) => log.inputs.push(i),
                Ok(rec) => {
                    if let Some(ev) = rec.to_timeline_event() {
                        log.timeline.push(ev);
                    }
                }
                Err(e) => {
                    log::debug!("skipping line {}: {e}", idx + 1);
                    log.skipped += 1;
                }
            }
        }

        log.keyframes.sort_by(|a, b| a.t.total_cmp(&b.t));
        log.inputs.sort_by(|a, b| a.t.total_cmp(&b.t));
        log.timeline.sort_by(|a, b| a.t.total_cmp(&b.t));
        log.normalize();
        log
    }

    /// Read and parse the named log from a store.
    pub fn load(store: &dyn LogStore, name: &str) -> Result<Self, LogError> {
        Ok(Self::from_lines(store.read_lines(name)?))
    }

    /// Shift every timestamp so the first keyframe starts at zero.
    ///
    /// Input and spawn/destroy timestamps shift by the same offset,
    /// preserving relative ordering. Events recorded before the first
    /// keyframe end up with negative timestamps and are dispatched
    /// immediately on playback, which matches their recorded effect.
    fn normalize(&mut self) {
        let Some(offset) = self.keyframes.first().map(|k| k.t) else {
            return;
        };
        if offset == 0.0 {
            return;
        }
        for k in &mut self.keyframes {
            k.t -= offset;
        }
        for i in &mut self.inputs {
            i.t -= offset;
        }
        for e in &mut self.timeline {
            e.t -= offset;
        }
    }

    /// The reproducible seed, when the header carries one. Presence
    /// selects deterministic re-simulation over interpolation.
    pub fn seed(&self) -> Option<u64> {
        self.header.as_ref().and_then(|h| h.seed)
    }

    /// Recorded viewport size, when a header is present.
    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.header.as_ref().map(|h| (h.w, h.h))
    }

    /// Timestamp of the last keyframe; playback finishes past this.
    pub fn duration(&self) -> f64 {
        self.keyframes.last().map(|k| k.t).unwrap_or(0.0)
    }

    /// Number of lines skipped as malformed during loading.
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    /// Whether the log has anything to play back.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty() && self.inputs.is_empty() && self.timeline.is_empty()
    }
}
