//! Playback engines for Gourd recordings.
//!
//! Two engines cover the two kinds of log:
//!
//! - [`DeterministicReplay`] re-simulates a seeded run exactly,
//!   feeding recorded inputs and spawns to a fresh [`Simulation`] and
//!   cross-checking consumption against the recorded timeline.
//! - [`InterpolatedReplay`] reconstructs positions purely from
//!   keyframes when no seed is available, with Manhattan interpolation
//!   for chain segments and grace-delayed removal for entities that
//!   drop out of the stream.
//!
//! [`ReplaySession`] wraps both in a browse/play/finish lifecycle over
//! a [`gourd_log::LogStore`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod deterministic;
pub mod interp;
pub mod interpolated;
pub mod session;
pub mod sim;

pub use deterministic::{DeterministicReplay, MismatchKind, ReplayMismatch, TIME_EPS};
pub use interp::{lerp, manhattan_lerp};
pub use interpolated::{InterpolatedReplay, PlaybackStatus, DEFAULT_GRACE};
pub use session::{ActivatedReplay, PlaybackMode, ReplaySession, SessionState};
pub use sim::{ConsumedEntity, Simulation};
