//! Resolver seam: turns a coordinate into concrete artifact files.
//!
//! The orchestrator depends only on this trait. Full dependency-graph
//! resolution stays outside the core; the bundled `LayoutResolver` only
//! looks up the named artifact in a local repository layout.

use crate::item::GavCoordinate;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// One resolved artifact file plus the coordinate key filters match against.
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    /// Coordinate key, e.g. `org.acme:widget:1.2.3:jar`.
    pub coordinate: String,
    /// Location of the resolved file on disk.
    pub path: PathBuf,
    /// File name to use at the destination.
    pub file_name: String,
}

/// Implemented by resolver backends (local layout, remote repository, test
/// fakes). Returns the artifact itself and, when the backend knows them,
/// its dependencies.
pub trait Resolver {
    fn resolve(&self, coordinate: &GavCoordinate) -> Result<Vec<ResolvedArtifact>>;
}

/// Resolver over a local repository layout:
/// `<root>/<group path>/<artifact>/<version>/<artifact>-<version>[-<classifier>].<type>`.
#[derive(Debug, Clone)]
pub struct LayoutResolver {
    root: PathBuf,
}

impl LayoutResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Resolver for LayoutResolver {
    fn resolve(&self, coordinate: &GavCoordinate) -> Result<Vec<ResolvedArtifact>> {
        let version = coordinate
            .version
            .as_deref()
            .with_context(|| format!("coordinate {} has no version", coordinate))?;

        let mut file_name = format!("{}-{}", coordinate.artifact_id, version);
        if let Some(classifier) = &coordinate.classifier {
            file_name.push('-');
            file_name.push_str(classifier);
        }
        file_name.push('.');
        file_name.push_str(&coordinate.kind);

        let path = self
            .root
            .join(coordinate.group_id.replace('.', "/"))
            .join(&coordinate.artifact_id)
            .join(version)
            .join(&file_name);
        anyhow::ensure!(path.is_file(), "artifact not found at {}", path.display());

        Ok(vec![ResolvedArtifact {
            coordinate: coordinate.to_string(),
            path,
            file_name,
        }])
    }
}
