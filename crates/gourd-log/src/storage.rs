//! Backing-store abstraction for recordings.
//!
//! The core treats storage as opaque: an append-only line sink on the
//! write path, and a store that lists logs and yields raw lines on the
//! read path. [`FsLogStore`] is the filesystem implementation; tests
//! use in-memory implementations.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::LogError;
use crate::LOG_EXTENSION;

/// An append-only destination for encoded log lines.
///
/// Implementations must tolerate `close` being called more than once.
/// `Send` because the writer thread owns the sink for the lifetime of
/// a recording session.
pub trait LineSink: Send {
    /// Append one encoded record. The sink supplies the line ending.
    fn append_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush buffered data and release the underlying resource.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `Vec<String>` collects lines in memory. Useful in tests.
impl LineSink for Vec<String> {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_owned());
        Ok(())
    }
}

/// A buffered file sink created by [`FsLogStore::create`].
pub struct FileSink {
    writer: Option<BufWriter<File>>,
}

impl LineSink for FileSink {
    fn append_line(&mut self, line: &str) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(w) => {
                w.write_all(line.as_bytes())?;
                w.write_all(b"\n")
            }
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed")),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.writer.take() {
            Some(mut w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Read/list/create access to a collection of recordings.
pub trait LogStore {
    /// Create (or truncate) a log and return its append sink.
    fn create(&self, name: &str) -> Result<Box<dyn LineSink>, LogError>;

    /// Names of available logs, oldest first.
    fn list(&self) -> Result<Vec<String>, LogError>;

    /// All raw lines of the named log.
    fn read_lines(&self, name: &str) -> Result<Vec<String>, LogError>;
}

/// Filesystem-backed log store: one `.jsonl` file per recording under
/// a single directory.
///
/// # Examples
///
/// ```no_run
/// use gourd_log::{FsLogStore, LogStore};
///
/// let store = FsLogStore::new("recordings");
/// for name in store.list().unwrap() {
///     println!("{name}");
/// }
/// ```
pub struct FsLogStore {
    dir: PathBuf,
}

impl FsLogStore {
    /// A store rooted at `dir`. The directory is created lazily on the
    /// first `create`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        let mut path = self.dir.join(name);
        if path.extension().is_none() {
            path.set_extension(LOG_EXTENSION);
        }
        path
    }
}

impl LogStore for FsLogStore {
    fn create(&self, name: &str) -> Result<Box<dyn LineSink>, LogError> {
        fs::create_dir_all(&self.dir)?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(self.path_for(name))?;
        Ok(Box::new(FileSink {
            writer: Some(BufWriter::new(file)),
        }))
    }

    fn list(&self) -> Result<Vec<String>, LogError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // A store that was never written to simply has no logs.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(LOG_EXTENSION) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_lines(&self, name: &str) -> Result<Vec<String>, LogError> {
        let path = self.path_for(name);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LogError::NotFound {
                    name: name.to_owned(),
                })
            }
            Err(e) => return Err(e.into()),
        };
        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            lines.push(line?);
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsLogStore::new(dir.path());

        let mut sink = store.create("run-1").unwrap();
        sink.append_line("alpha").unwrap();
        sink.append_line("beta").unwrap();
        sink.close().unwrap();

        assert_eq!(store.list().unwrap(), vec!["run-1.jsonl"]);
        assert_eq!(store.read_lines("run-1").unwrap(), vec!["alpha", "beta"]);
        // Listing accepts the full filename too.
        assert_eq!(
            store.read_lines("run-1.jsonl").unwrap(),
            vec!["alpha", "beta"]
        );
    }

    #[test]
    fn recreating_a_name_starts_a_fresh_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsLogStore::new(dir.path());

        let mut sink = store.create("run-1").unwrap();
        sink.append_line("stale-header").unwrap();
        sink.close().unwrap();

        let mut sink = store.create("run-1").unwrap();
        sink.append_line("fresh-header").unwrap();
        sink.close().unwrap();

        assert_eq!(store.read_lines("run-1").unwrap(), vec!["fresh-header"]);
    }

    #[test]
    fn empty_store_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsLogStore::new(dir.path().join("never-created"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn missing_log_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsLogStore::new(dir.path());
        assert!(matches!(
            store.read_lines("absent"),
            Err(LogError::NotFound { .. })
        ));
    }

    #[test]
    fn closed_file_sink_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsLogStore::new(dir.path());
        let mut sink = store.create("run-2").unwrap();
        sink.close().unwrap();
        sink.close().unwrap(); // idempotent
        assert!(sink.append_line("late").is_err());
    }
}
