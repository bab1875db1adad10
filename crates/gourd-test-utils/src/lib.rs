//! Shared test fixtures: in-memory log storage and small builders used
//! across the workspace's unit and integration tests.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Condvar, Mutex};

use gourd_core::{EntityId, EntitySnapshot};
use gourd_log::{LineSink, LogError, LogStore};

/// A cloneable in-memory [`LineSink`]: every clone appends to the same
/// shared line buffer, so a test can hand one clone to a writer thread
/// and inspect the other.
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<bool>>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything appended so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Whether `close` has been called on any clone.
    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }
}

impl LineSink for MemorySink {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        self.lines.lock().unwrap().push(line.to_owned());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

/// Handle that releases a stalled [`GateSink`].
#[derive(Clone)]
pub struct Gate {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    /// Unblock every write waiting on the gate, permanently.
    pub fn open(&self) {
        let (lock, cvar) = &*self.state;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }
}

/// A sink whose writes block until its [`Gate`] is opened. Used to
/// stall the writer thread and provoke backpressure on the channel.
pub struct GateSink {
    state: Arc<(Mutex<bool>, Condvar)>,
    lines: Vec<String>,
}

impl GateSink {
    /// A sink with a closed gate.
    pub fn new() -> Self {
        Self {
            state: Arc::new((Mutex::new(false), Condvar::new())),
            lines: Vec::new(),
        }
    }

    /// The control handle for this sink's gate.
    pub fn gate(&self) -> Gate {
        Gate {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for GateSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSink for GateSink {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        let (lock, cvar) = &*self.state;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
        self.lines.push(line.to_owned());
        Ok(())
    }
}

/// An in-memory [`LogStore`], one named line buffer per log. Clones
/// share contents, so a sink created from one clone is visible to all.
#[derive(Clone, Default)]
pub struct MemoryStore {
    logs: Arc<Mutex<BTreeMap<String, Vec<String>>>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a log with raw lines.
    pub fn insert(&self, name: &str, lines: Vec<String>) {
        self.logs.lock().unwrap().insert(name.to_owned(), lines);
    }
}

struct MemoryStoreSink {
    name: String,
    logs: Arc<Mutex<BTreeMap<String, Vec<String>>>>,
}

impl LineSink for MemoryStoreSink {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        self.logs
            .lock()
            .unwrap()
            .entry(self.name.clone())
            .or_default()
            .push(line.to_owned());
        Ok(())
    }
}

impl LogStore for MemoryStore {
    fn create(&self, name: &str) -> Result<Box<dyn LineSink>, LogError> {
        self.logs
            .lock()
            .unwrap()
            .insert(name.to_owned(), Vec::new());
        Ok(Box::new(MemoryStoreSink {
            name: name.to_owned(),
            logs: Arc::clone(&self.logs),
        }))
    }

    fn list(&self) -> Result<Vec<String>, LogError> {
        Ok(self.logs.lock().unwrap().keys().cloned().collect())
    }

    fn read_lines(&self, name: &str) -> Result<Vec<String>, LogError> {
        self.logs
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| LogError::NotFound {
                name: name.to_owned(),
            })
    }
}

/// Shorthand for a positioned snapshot with default render settings.
pub fn snapshot(id: &str, x: f64, y: f64) -> EntitySnapshot {
    EntitySnapshot::at(EntityId::from(id), x, y)
}
