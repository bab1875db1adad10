//! Strongly-typed identifiers for entities and keys.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a logical entity within a recording.
///
/// Ids are stable across keyframes for the same logical entity: the
/// third body segment is `seg2` in every keyframe it appears in, which
/// is what lets the interpolated replay engine match entities by
/// identity instead of by position in the entity list.
///
/// # Examples
///
/// ```
/// use gourd_core::EntityId;
///
/// let head = EntityId::from("head");
/// let seg = EntityId::from("seg3");
/// assert!(!head.is_chain_segment());
/// assert!(seg.is_chain_segment());
/// assert_eq!(seg.chain_index(), Some(3));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Prefix shared by all chain-segment ids.
    pub const SEGMENT_PREFIX: &'static str = "seg";

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id names a chain segment (`seg0`, `seg1`, ...).
    ///
    /// Chain segments form an ordered linked body; their relative order
    /// must survive across keyframes and their motion is interpolated
    /// axis-by-axis rather than diagonally.
    pub fn is_chain_segment(&self) -> bool {
        self.chain_index().is_some()
    }

    /// The segment's position in the chain, if this is a chain id.
    ///
    /// `seg0` is the segment closest to the head. Ids with the prefix
    /// but a non-numeric suffix are not chain segments.
    pub fn chain_index(&self) -> Option<usize> {
        let suffix = self.0.strip_prefix(Self::SEGMENT_PREFIX)?;
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        suffix.parse().ok()
    }

    /// Build the id for the chain segment at `index`.
    pub fn chain_segment(index: usize) -> Self {
        Self(format!("{}{index}", Self::SEGMENT_PREFIX))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A keyboard key code as recorded in input events.
///
/// Values follow the recording format's key numbering (arrow keys are
/// 37–40, letters use their ASCII uppercase codes), so logs written by
/// older engine builds replay unchanged.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct KeyCode(pub u16);

impl KeyCode {
    /// Left arrow.
    pub const LEFT: KeyCode = KeyCode(37);
    /// Up arrow.
    pub const UP: KeyCode = KeyCode(38);
    /// Right arrow.
    pub const RIGHT: KeyCode = KeyCode(39);
    /// Down arrow.
    pub const DOWN: KeyCode = KeyCode(40);
    /// Enter / activate.
    pub const ENTER: KeyCode = KeyCode(10);
    /// The `A` key.
    pub const A: KeyCode = KeyCode(65);
    /// The `D` key.
    pub const D: KeyCode = KeyCode(68);
    /// The `S` key.
    pub const S: KeyCode = KeyCode(83);
    /// The `W` key.
    pub const W: KeyCode = KeyCode(87);
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for KeyCode {
    fn from(v: u16) -> Self {
        Self(v)
    }
}
