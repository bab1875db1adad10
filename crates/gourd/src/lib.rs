//! Gourd: recording and replay for real-time simulations.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Gourd sub-crates. For most users, adding `gourd` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```
//! use gourd::prelude::*;
//!
//! // Record a short seeded run into an in-memory sink.
//! let mut recorder = Recorder::new(RecorderConfig::default());
//! recorder.start(Box::new(Vec::<String>::new()), (800, 600), Some(42));
//!
//! let mut world = SnakeWorld::new(800, 600, 42);
//! let mut input = InputContext::new();
//! for _ in 0..60 {
//!     let entities = world.snapshot_entities();
//!     recorder.sample(1.0 / 60.0, &entities, &input.pressed_snapshot());
//!     world.advance(1.0 / 60.0, &mut input);
//! }
//! recorder.stop();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gourd-core` | IDs, snapshots, input context, timeline events |
//! | [`log`] | `gourd-log` | Record grammar, codec, storage, log loading |
//! | [`recorder`] | `gourd-recorder` | Tick-thread recorder and background writer |
//! | [`replay`] | `gourd-replay` | Deterministic and interpolated playback engines |
//! | [`snake`] | `gourd-snake` | The reference recordable/replayable game |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Shared data model (`gourd-core`).
///
/// Entity ids and key codes, [`types::EntitySnapshot`] and
/// [`types::Keyframe`], the explicit [`types::InputContext`], and the
/// spawn/destroy timeline types.
pub use gourd_core as types;

/// The event log (`gourd-log`).
///
/// The JSON-lines record grammar ([`log::Record`]), best-effort
/// loading into a normalized [`log::ReplayLog`], and the
/// [`log::LogStore`] storage seam.
pub use gourd_log as log;

/// Recording (`gourd-recorder`).
///
/// [`recorder::Recorder`] samples the tick thread; a background writer
/// drains its bounded queue into a [`log::LineSink`].
pub use gourd_recorder as recorder;

/// Playback (`gourd-replay`).
///
/// [`replay::DeterministicReplay`] re-simulates seeded logs exactly;
/// [`replay::InterpolatedReplay`] reconstructs seedless logs from
/// keyframes; [`replay::ReplaySession`] wraps both in a browse/play
/// lifecycle.
pub use gourd_replay as replay;

/// The reference game (`gourd-snake`).
///
/// [`snake::SnakeWorld`] implements [`replay::Simulation`], recorded
/// live through [`snake::LiveGame`].
pub use gourd_snake as snake;

/// Common imports for typical Gourd usage.
///
/// ```
/// use gourd::prelude::*;
/// ```
pub mod prelude {
    pub use gourd_core::{
        EntityId, EntitySnapshot, InputContext, InputEvent, KeyCode, Keyframe, TimelineEvent,
    };

    pub use gourd_log::{FsLogStore, LogError, LogStore, Record, ReplayLog};

    pub use gourd_recorder::{Recorder, RecorderConfig};

    pub use gourd_replay::{
        DeterministicReplay, InterpolatedReplay, PlaybackMode, PlaybackStatus, ReplaySession,
        SessionState, Simulation,
    };

    pub use gourd_snake::{LiveGame, SnakeWorld};
}
