//! Unarchiver seam plus a zip-backed implementation.
//!
//! Extraction is delegated to the `zip` codec; this module walks entries,
//! applies the include/exclude filter, and keeps entry paths inside the
//! destination. Entry permissions are ignored.

use crate::filter::{self, PatternFilter};
use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

/// Implemented by extraction backends. `filter` selects entries by their
/// normalized relative path; rejected entries are not written.
pub trait Unarchiver {
    /// Extract `archive` into `dest_dir`. Returns the number of files written.
    fn extract(&self, archive: &Path, dest_dir: &Path, filter: &PatternFilter) -> Result<u64>;
}

/// Zip extraction. Entries whose names would escape the destination are
/// rejected instead of being rewritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipUnarchiver;

impl Unarchiver for ZipUnarchiver {
    fn extract(&self, archive: &Path, dest_dir: &Path, filter: &PatternFilter) -> Result<u64> {
        let file = fs::File::open(archive)
            .with_context(|| format!("open archive {}", archive.display()))?;
        let mut zip = zip::ZipArchive::new(file)
            .with_context(|| format!("read archive {}", archive.display()))?;

        let mut written = 0u64;
        for index in 0..zip.len() {
            let mut entry = zip
                .by_index(index)
                .with_context(|| format!("read entry {} of {}", index, archive.display()))?;
            let rel = match entry.enclosed_name() {
                Some(rel) => rel,
                None => anyhow::bail!(
                    "entry {:?} in {} escapes the destination",
                    entry.name(),
                    archive.display()
                ),
            };

            let key = filter::normalize_path(&rel);
            if !filter.accepts(&key) {
                tracing::debug!("filtered out archive entry {}", key);
                continue;
            }

            let out = dest_dir.join(&rel);
            if entry.is_dir() {
                fs::create_dir_all(&out)
                    .with_context(|| format!("create {}", out.display()))?;
                continue;
            }
            if let Some(parent) = out.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            let mut dest = fs::File::create(&out)
                .with_context(|| format!("create {}", out.display()))?;
            io::copy(&mut entry, &mut dest)
                .with_context(|| format!("write {}", out.display()))?;
            written += 1;
        }
        Ok(written)
    }
}
