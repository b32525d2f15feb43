//! Error taxonomy for transfer and tracking operations.
//!
//! Configuration problems surface before any I/O happens; everything else is
//! fatal for the owning item and carries the context (path, URL, status) a
//! caller needs to act. Skipping an already-tracked item is not an error.

use std::path::PathBuf;
use thiserror::Error;

/// Collaborator errors (resolver, unarchiver) cross the seam as boxed errors.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid configuration: bad glob pattern, unsupported proxy protocol,
    /// missing required field. Aborts the run before any network or
    /// filesystem activity.
    #[error("configuration error: {0}")]
    Config(String),

    /// Local read/write failure (tracking file, copy target, download target).
    #[error("I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network-level failure reported by libcurl (timeout, DNS, reset).
    #[error("network failure for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: curl::Error,
    },

    /// A download answered with a non-2xx status.
    #[error("GET {url} returned HTTP {status}")]
    UnexpectedStatus { url: String, status: u32 },

    /// Downloaded content does not hash to the expected digest. The partial
    /// file is removed and the item must not be recorded as completed.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// An upload answered with a non-2xx status; the response body is kept
    /// for diagnostics.
    #[error("upload rejected with HTTP {status}: {body}")]
    UploadRejected { status: u32, body: String },

    /// The dependency resolver collaborator failed.
    #[error("failed to resolve {coordinate}")]
    Resolve {
        coordinate: String,
        #[source]
        source: SourceError,
    },

    /// The unarchiver collaborator failed.
    #[error("failed to extract {path}")]
    Extract {
        path: PathBuf,
        #[source]
        source: SourceError,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn network(url: impl Into<String>, source: curl::Error) -> Self {
        SyncError::Network {
            url: url.into(),
            source,
        }
    }
}
