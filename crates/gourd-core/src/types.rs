//! The shared data model: geometry, color, render kinds, entity
//! snapshots, keyframes, and timeline events.
//!
//! Types that appear verbatim in the log grammar ([`EntitySnapshot`],
//! [`Keyframe`], [`InputEvent`]) carry serde derives with the frozen
//! wire field names; the rest are plain in-memory types.

use std::fmt;

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

use crate::id::{EntityId, KeyCode};

/// A position on the simulation grid, in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridPos {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl GridPos {
    /// Construct a grid position.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An RGBA color with components in `[0, 1]`.
///
/// Serialized as a JSON array `[r, g, b, a]`. Decoding also accepts
/// three-element arrays, defaulting alpha to 1: older logs wrote
/// spawn colors without the alpha channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Rgba {
    /// Construct an opaque color.
    pub fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Construct a color with explicit alpha.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(4))?;
        for c in [self.r, self.g, self.b, self.a] {
            seq.serialize_element(&c)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RgbaVisitor;

        impl<'de> Visitor<'de> for RgbaVisitor {
            type Value = Rgba;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of 3 or 4 color components")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Rgba, A::Error> {
                let r = seq.next_element()?.unwrap_or(1.0);
                let g = seq.next_element()?.unwrap_or(1.0);
                let b = seq.next_element()?.unwrap_or(1.0);
                let a = seq.next_element()?.unwrap_or(1.0);
                // Drain any extra components rather than erroring.
                while seq.next_element::<f32>()?.is_some() {}
                Ok(Rgba { r, g, b, a })
            }
        }

        deserializer.deserialize_seq(RgbaVisitor)
    }
}

/// How an entity is drawn, as recorded in keyframes.
///
/// Unknown strings in a log decode as [`RenderKind::Custom`]: the
/// replay can still track the entity even if it cannot reproduce its
/// exact appearance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RenderKind {
    /// Axis-aligned rectangle.
    #[default]
    Rectangle,
    /// Circle.
    Circle,
    /// Line segment.
    Line,
    /// Custom-drawn entity; the replay approximates it.
    #[serde(other)]
    Custom,
}

/// One entity's recorded state within a keyframe.
///
/// # Examples
///
/// ```
/// use gourd_core::{EntitySnapshot, EntityId, RenderKind};
///
/// let snap = EntitySnapshot::at(EntityId::from("head"), 40.0, 60.0);
/// assert_eq!(snap.rt, RenderKind::Rectangle);
/// assert!(snap.color.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Stable identity, unique within a keyframe.
    pub id: EntityId,
    /// Horizontal position in world units.
    pub x: f64,
    /// Vertical position in world units.
    pub y: f64,
    /// Render kind; defaults to a rectangle when absent from a log.
    #[serde(default)]
    pub rt: RenderKind,
    /// Render width, when the entity carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    /// Render height, when the entity carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    /// RGBA color, when the entity carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba>,
}

impl EntitySnapshot {
    /// A minimal snapshot: position only, default render kind.
    pub fn at(id: EntityId, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            rt: RenderKind::default(),
            w: None,
            h: None,
            color: None,
        }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }
}

/// A timestamped snapshot of all recorded entities.
///
/// Invariants maintained by the recorder: entity ids are unique within
/// one keyframe, entities are sorted by id, and timestamps are
/// non-decreasing across the keyframe stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Seconds since recording started (normalized on load so the
    /// first keyframe sits at exactly 0).
    pub t: f64,
    /// Recorded entities, sorted by id.
    pub entities: Vec<EntitySnapshot>,
}

impl Keyframe {
    /// Look up an entity by id.
    pub fn entity(&self, id: &EntityId) -> Option<&EntitySnapshot> {
        self.entities.iter().find(|e| &e.id == id)
    }
}

/// Whether an input event is a press edge or a release edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputAction {
    /// Keys went down this tick.
    Press,
    /// Keys went up this tick.
    Release,
}

/// An input edge: the set of keys that changed state on one tick.
///
/// The recorder emits edges only (one `press` event batching every
/// newly-down key, one `release` event for every newly-up key), never
/// per-tick level samples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Seconds since recording started.
    pub t: f64,
    /// Press or release.
    pub action: InputAction,
    /// The key codes that changed together.
    pub keys: SmallVec<[KeyCode; 4]>,
}

impl InputEvent {
    /// Whether this is a release edge.
    pub fn is_release(&self) -> bool {
        self.action == InputAction::Release
    }
}

/// A spawn or destroy event on the replay timeline.
///
/// Built by the log loader from `spawn`/`destroy` records; the two
/// kinds share one timeline so the deterministic engine can dispatch
/// them in timestamp order.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEvent {
    /// Seconds since recording started.
    pub t: f64,
    /// The entity this event concerns.
    pub id: EntityId,
    /// Spawn payload, or a bare destroy marker.
    pub payload: TimelinePayload,
}

/// Payload of a [`TimelineEvent`].
#[derive(Clone, Debug, PartialEq)]
pub enum TimelinePayload {
    /// The entity appeared at a grid cell, optionally colored.
    Spawn {
        /// Grid cell the entity spawned in.
        pos: GridPos,
        /// Recorded color, if any.
        color: Option<Rgba>,
    },
    /// The entity was consumed by the simulation. Advisory during
    /// deterministic replay: removal re-emerges from the step itself.
    Destroy,
}

impl TimelineEvent {
    /// Whether this is a spawn event.
    pub fn is_spawn(&self) -> bool {
        matches!(self.payload, TimelinePayload::Spawn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_roundtrips_as_array() {
        let c = Rgba::new(1.0, 0.5, 0.0, 0.75);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "[1.0,0.5,0.0,0.75]");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn rgba_accepts_three_components() {
        let c: Rgba = serde_json::from_str("[0.2,0.4,0.6]").unwrap();
        assert_eq!(c, Rgba::opaque(0.2, 0.4, 0.6));
    }

    #[test]
    fn render_kind_uses_uppercase_names() {
        assert_eq!(
            serde_json::to_string(&RenderKind::Rectangle).unwrap(),
            "\"RECTANGLE\""
        );
        let k: RenderKind = serde_json::from_str("\"CIRCLE\"").unwrap();
        assert_eq!(k, RenderKind::Circle);
    }

    #[test]
    fn unknown_render_kind_decodes_as_custom() {
        let k: RenderKind = serde_json::from_str("\"SPRITE\"").unwrap();
        assert_eq!(k, RenderKind::Custom);
    }

    #[test]
    fn entity_snapshot_omits_absent_options() {
        let snap = EntitySnapshot::at(EntityId::from("head"), 40.0, 60.0);
        let json = serde_json::to_string(&snap).unwrap();
        assert!(!json.contains("\"w\""));
        assert!(!json.contains("\"color\""));
    }
}
