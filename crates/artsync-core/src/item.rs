//! Transfer items: one unit of work each, keyed by a deterministic identity.
//!
//! The identity string is the tracking key, so it must be stable for the
//! same logical input across runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Maven-style coordinate identifying an artifact for a copy item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GavCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub classifier: Option<String>,
    /// Packaging type, e.g. "jar", "war", "zip".
    pub kind: String,
}

impl GavCoordinate {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: None,
            classifier: None,
            kind: "jar".to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

/// `group:artifact[:classifier]:version:type`, with `?` for a missing
/// version. This exact shape is the tracking key for copy items, so it must
/// not change between releases.
impl fmt::Display for GavCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self.version.as_deref().unwrap_or("?");
        match &self.classifier {
            Some(classifier) => write!(
                f,
                "{}:{}:{}:{}:{}",
                self.group_id, self.artifact_id, classifier, version, self.kind
            ),
            None => write!(
                f,
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, version, self.kind
            ),
        }
    }
}

/// HTTP method for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMethod {
    #[default]
    Put,
    Post,
}

impl UploadMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMethod::Put => "PUT",
            UploadMethod::Post => "POST",
        }
    }
}

/// One unit of transfer work.
#[derive(Debug, Clone)]
pub enum TransferItem {
    /// Copy resolved artifacts for a coordinate into a local directory,
    /// filtered by coordinate patterns.
    Copy {
        coordinate: GavCoordinate,
        dest_dir: PathBuf,
        includes: Vec<String>,
        excludes: Vec<String>,
    },
    /// Download a remote file, optionally verify its SHA-256 and unpack it.
    Download {
        uri: String,
        dest_dir: PathBuf,
        /// Target file name; derived from the URI path when absent.
        file_name: Option<String>,
        sha256: Option<String>,
        unpack: bool,
    },
    /// Extract a local archive with include/exclude entry selection.
    Unpack {
        archive: PathBuf,
        dest_dir: PathBuf,
        includes: Vec<String>,
        excludes: Vec<String>,
    },
    /// Upload a single local file to a path on the repository.
    Upload {
        file: PathBuf,
        server_path: String,
        method: UploadMethod,
        headers: Vec<(String, String)>,
        preemptive: bool,
        /// Treat a missing file as a logged no-op instead of a failure.
        ignore_missing: bool,
    },
    /// Upload every file under a directory that passes the include/exclude
    /// filter, each to `server_path` plus its relative path.
    UploadSet {
        base_dir: PathBuf,
        server_path: String,
        includes: Vec<String>,
        excludes: Vec<String>,
        method: UploadMethod,
        headers: Vec<(String, String)>,
        preemptive: bool,
    },
}

impl TransferItem {
    /// The stable tracking key for this item.
    pub fn identity(&self) -> String {
        match self {
            TransferItem::Copy { coordinate, .. } => coordinate.to_string(),
            TransferItem::Download { uri, .. } => uri.clone(),
            TransferItem::Unpack {
                archive, dest_dir, ..
            } => format!("unpack:{}:{}", archive.display(), dest_dir.display()),
            TransferItem::Upload {
                file,
                server_path,
                method,
                ..
            } => format!(
                "upload:{}:{}:{}",
                method.as_str(),
                server_path,
                file.display()
            ),
            TransferItem::UploadSet {
                base_dir,
                server_path,
                method,
                ..
            } => format!(
                "upload-set:{}:{}:{}",
                method.as_str(),
                server_path,
                base_dir.display()
            ),
        }
    }

    /// Include/exclude pattern lists for this item (empty for items without
    /// filtering). Compiled up front by the orchestrator.
    pub fn patterns(&self) -> (&[String], &[String]) {
        match self {
            TransferItem::Copy {
                includes, excludes, ..
            }
            | TransferItem::Unpack {
                includes, excludes, ..
            }
            | TransferItem::UploadSet {
                includes, excludes, ..
            } => (includes, excludes),
            TransferItem::Download { .. } | TransferItem::Upload { .. } => (&[], &[]),
        }
    }
}

/// Derive a destination file name from the last segment of a URI path.
pub fn file_name_from_uri(uri: &str) -> Option<String> {
    let url = Url::parse(uri).ok()?;
    url.path_segments()?
        .last()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}
