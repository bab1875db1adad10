//! Core types for the Gourd recording/replay subsystem.
//!
//! Holds the identifiers, geometry/color primitives, and the shared
//! data model (entity snapshots, keyframes, input and spawn/destroy
//! events) that the log grammar, the recorder, and both replay engines
//! agree on. Also provides [`InputContext`], the explicit input-state
//! object that replaces any process-global input singleton so tests
//! can inject synthetic input streams.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod input;
pub mod types;

pub use id::{EntityId, KeyCode};
pub use input::InputContext;
pub use types::{
    EntitySnapshot, GridPos, InputAction, InputEvent, Keyframe, RenderKind, Rgba, TimelineEvent,
    TimelinePayload,
};
