//! Include/exclude glob filtering over coordinate keys and relative paths.

use crate::error::SyncError;
use glob::Pattern;
use std::path::Path;

/// Compiled include/exclude predicate.
///
/// A candidate is accepted iff it matches at least one include pattern (an
/// empty include list accepts everything) and matches none of the exclude
/// patterns. Exclude wins when both match. Patterns are compiled with the
/// default match options, so `*` may span path separators and patterns like
/// `**/*.xml` work on both flat names and nested paths.
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    includes: Vec<Pattern>,
    excludes: Vec<Pattern>,
}

impl PatternFilter {
    /// Compile pattern lists into a predicate. A syntactically invalid
    /// pattern is a configuration error, detected here rather than at match
    /// time so a bad pattern aborts the run before any I/O.
    pub fn compile(includes: &[String], excludes: &[String]) -> Result<Self, SyncError> {
        Ok(Self {
            includes: compile_list(includes)?,
            excludes: compile_list(excludes)?,
        })
    }

    /// Filter with no patterns: accepts everything.
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn accepts(&self, candidate: &str) -> bool {
        let included =
            self.includes.is_empty() || self.includes.iter().any(|p| p.matches(candidate));
        let excluded = self.excludes.iter().any(|p| p.matches(candidate));
        included && !excluded
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

fn compile_list(patterns: &[String]) -> Result<Vec<Pattern>, SyncError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| SyncError::Config(format!("invalid pattern {:?}: {}", p, e)))
        })
        .collect()
}

/// Normalize a relative path to the forward-slash form patterns match against.
pub fn normalize_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
