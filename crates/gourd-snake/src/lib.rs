//! The reference Gourd game: a grid snake with seeds and monsters.
//!
//! [`SnakeWorld`] implements [`gourd_replay::Simulation`], so one
//! simulation type serves three roles: live play via [`LiveGame`]
//! (which records through [`gourd_recorder::Recorder`]), deterministic
//! replay via [`gourd_replay::DeterministicReplay`], and the source of
//! keyframes consumed by interpolated playback.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod live;
pub mod world;

pub use live::LiveGame;
pub use world::{GameOverReason, SnakeConfig, SnakeWorld, SpawnedSeed, WorldSummary, SEED_COLORS};
