//! The Gourd event log: a line-oriented, timestamp-ordered record
//! grammar shared by the recorder (writer side) and the replay engines
//! (reader side).
//!
//! # Format
//!
//! Append-only UTF-8 text, one self-describing JSON object per line,
//! tagged by `"type"`:
//!
//! ```text
//! {"type":"header","version":1,"w":800,"h":600,"seed":1763820688929}
//! {"type":"input","t":0.8,"action":"press","keys":[39]}
//! {"type":"keyframe","t":1.0,"entities":[{"id":"head","x":400.0,"y":300.0,"rt":"CUSTOM"}]}
//! {"type":"spawn","t":1.2,"entity":{"id":"seed0","type":"seed","gx":12,"gy":7,"color":[1.0,0.5,0.0,1.0]}}
//! {"type":"destroy","t":2.4,"id":"seed0"}
//! ```
//!
//! Field names are frozen: logs written by earlier engine builds decode
//! unchanged. Ordering within a file is write order, FIFO-consistent
//! with generation order on the producer thread. Numeric fields always
//! use `.` as the decimal separator regardless of host locale.
//!
//! Parsing is best-effort: a malformed line is skipped (and counted) so
//! one corrupt record never aborts a whole load.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod load;
pub mod record;
pub mod storage;

pub use error::LogError;
pub use load::ReplayLog;
pub use record::{decode_line, encode_line, quantize, Header, Record, SpawnedEntity};
pub use storage::{FsLogStore, LineSink, LogStore};

/// Current schema version written into every header record.
pub const SCHEMA_VERSION: u32 = 1;

/// File extension used for recordings on filesystem stores.
pub const LOG_EXTENSION: &str = "jsonl";
