//! Typed encode/decode for the five record kinds.
//!
//! Replaces ad hoc brace scanning with a structured pair: [`Record`]
//! is an internally-tagged enum whose serde field names match the
//! on-disk grammar exactly, so existing logs decode without migration
//! while gaining typed validation.

use serde::{Deserialize, Serialize};

use gourd_core::{
    EntityId, GridPos, InputEvent, Keyframe, Rgba, TimelineEvent, TimelinePayload,
};

use crate::error::LogError;
use crate::SCHEMA_VERSION;

/// The first record of every log: schema version, viewport size, and
/// the simulation's reproducible seed when it exposes one.
///
/// Seed presence selects the replay strategy: deterministic
/// re-simulation with it, keyframe interpolation without.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Schema version; see [`SCHEMA_VERSION`](crate::SCHEMA_VERSION).
    #[serde(default = "default_version")]
    pub version: u32,
    /// Viewport width at recording time, in pixels.
    pub w: u32,
    /// Viewport height at recording time, in pixels.
    pub h: u32,
    /// Reproducible RNG seed, when the simulation exposed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

impl Header {
    /// Header for the given viewport, with or without a seed.
    pub fn new(w: u32, h: u32, seed: Option<u64>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            w,
            h,
            seed,
        }
    }
}

/// The nested entity object of a `spawn` record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnedEntity {
    /// Identity of the spawned entity.
    pub id: EntityId,
    /// Entity class tag (e.g. `"seed"`).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Grid column.
    pub gx: i32,
    /// Grid row.
    pub gy: i32,
    /// Recorded color, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba>,
}

/// A `spawn` record: the simulation created an entity at a grid cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    /// Seconds since recording started.
    pub t: f64,
    /// The spawned entity.
    pub entity: SpawnedEntity,
}

/// A `destroy` record: the simulation consumed an entity. Id-only;
/// position and color were captured by the matching spawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestroyRecord {
    /// Seconds since recording started.
    pub t: f64,
    /// The consumed entity.
    pub id: EntityId,
}

/// One line of the log, tagged by its `"type"` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Record {
    /// Log header; first record, one per log.
    Header(Header),
    /// Periodic entity snapshot.
    Keyframe(Keyframe),
    /// Input press/release edge.
    Input(InputEvent),
    /// Entity creation with position and color.
    Spawn(SpawnRecord),
    /// Entity consumption, id-only.
    Destroy(DestroyRecord),
}

impl Record {
    /// The record's timestamp, if the kind carries one.
    pub fn timestamp(&self) -> Option<f64> {
        match self {
            Self::Header(_) => None,
            Self::Keyframe(k) => Some(k.t),
            Self::Input(i) => Some(i.t),
            Self::Spawn(s) => Some(s.t),
            Self::Destroy(d) => Some(d.t),
        }
    }

    /// Convert a spawn/destroy record into a replay timeline event.
    /// Returns `None` for the other kinds.
    pub fn to_timeline_event(&self) -> Option<TimelineEvent> {
        match self {
            Self::Spawn(s) => Some(TimelineEvent {
                t: s.t,
                id: s.entity.id.clone(),
                payload: TimelinePayload::Spawn {
                    pos: GridPos::new(s.entity.gx, s.entity.gy),
                    color: s.entity.color,
                },
            }),
            Self::Destroy(d) => Some(TimelineEvent {
                t: d.t,
                id: d.id.clone(),
                payload: TimelinePayload::Destroy,
            }),
            _ => None,
        }
    }
}

/// Encode one record as a single log line (no trailing newline).
///
/// serde_json always renders numbers with `.` as the decimal
/// separator, independent of host locale.
pub fn encode_line(record: &Record) -> Result<String, LogError> {
    serde_json::to_string(record).map_err(|e| LogError::EncodeFailed {
        detail: e.to_string(),
    })
}

/// Decode one log line into a typed record.
pub fn decode_line(line: &str) -> Result<Record, LogError> {
    serde_json::from_str(line).map_err(|e| LogError::MalformedRecord {
        detail: e.to_string(),
    })
}

/// Round `v` to `decimals` decimal places.
///
/// Applied to positions and sizes before encoding so logs stay compact
/// and reproduce identically across platforms.
///
/// # Examples
///
/// ```
/// use gourd_log::quantize;
///
/// assert_eq!(quantize(1.23456, 3), 1.235);
/// assert_eq!(quantize(-0.0004, 3), -0.0);
/// ```
pub fn quantize(v: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (v * scale).round() / scale
}
