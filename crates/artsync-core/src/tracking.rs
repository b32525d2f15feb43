//! Tracking file: the persisted set of completed transfer identities.
//!
//! One identity per line, UTF-8. A missing file reads as an empty set. The
//! flush stages the whole set into a temp file next to the target and then
//! renames it into place, so a failed write never truncates state recorded
//! by earlier runs.

use crate::error::SyncError;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Default tracking file name, used when the caller does not override it.
pub const DEFAULT_TRACKING_FILENAME: &str = "artsync.tracking";

/// In-memory set of completed identities.
///
/// Loaded once at run start, mutated in memory as items complete, flushed
/// once at run end. Set semantics make duplicate inserts idempotent, which
/// is what keeps the file free of duplicate lines.
#[derive(Debug, Clone, Default)]
pub struct TrackingSet {
    entries: BTreeSet<String>,
}

impl TrackingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a tracking set from `path`. A missing file is an empty set;
    /// any other read error is an I/O failure.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        match fs::read_to_string(path) {
            Ok(data) => Ok(Self {
                entries: data
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(SyncError::io(path, e)),
        }
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains(identity)
    }

    /// Record an identity. Returns true if it was not present before.
    pub fn insert(&mut self, identity: &str) -> bool {
        self.entries.insert(identity.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Write the full set to `path`, one identity per line, creating parent
    /// directories as needed. All-or-nothing: the data lands in a temp file
    /// first and is renamed over the target only once fully written.
    pub fn flush(&self, path: &Path) -> Result<(), SyncError> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent {
            fs::create_dir_all(dir).map_err(|e| SyncError::io(dir, e))?;
        }
        let dir = parent.unwrap_or_else(|| Path::new("."));
        let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(|e| SyncError::io(dir, e))?;
        for identity in &self.entries {
            writeln!(staged, "{}", identity).map_err(|e| SyncError::io(path, e))?;
        }
        staged
            .persist(path)
            .map_err(|e| SyncError::io(path, e.error))?;
        Ok(())
    }
}
