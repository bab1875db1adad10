//! Error types for the log format and its backing stores.

use std::fmt;
use std::io;

/// Errors from encoding, decoding, or storing log records.
#[derive(Debug)]
pub enum LogError {
    /// An I/O error from the backing store.
    Io(io::Error),
    /// A line could not be decoded as any known record kind.
    MalformedRecord {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A record could not be encoded. Indicates a programming error
    /// (the grammar types always serialize) but is surfaced rather
    /// than panicking on the tick thread.
    EncodeFailed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The named log does not exist in the store.
    NotFound {
        /// The name that was requested.
        name: String,
    },
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MalformedRecord { detail } => write!(f, "malformed record: {detail}"),
            Self::EncodeFailed { detail } => write!(f, "record encoding failed: {detail}"),
            Self::NotFound { name } => write!(f, "no such log: {name}"),
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for LogError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
