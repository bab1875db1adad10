//! Asynchronous recording for Gourd simulations.
//!
//! The [`Recorder`] runs on the simulation's own tick thread and never
//! blocks it: every record is handed to a bounded channel consumed by
//! a dedicated background writer thread that appends to the log sink.
//!
//! # Loss policy
//!
//! Capture is best-effort telemetry, not a transaction log. When the
//! channel is full the record is dropped silently and a counter
//! increments, so recording never slows the simulation tick. A graceful
//! [`stop`](Recorder::stop), by contrast, drains the channel
//! completely before the writer exits, so every record enqueued before
//! stop reaches the sink in enqueue order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod recorder;
mod writer;

pub use config::RecorderConfig;
pub use recorder::Recorder;
