//! `artsync unpack <archive>` – extract a zip with entry filtering.

use anyhow::Result;
use artsync_core::archive::{Unarchiver, ZipUnarchiver};
use artsync_core::filter::PatternFilter;
use std::fs;
use std::path::Path;

pub fn run_unpack(
    archive: &Path,
    dest_dir: &Path,
    includes: &[String],
    excludes: &[String],
) -> Result<()> {
    let filter = PatternFilter::compile(includes, excludes)?;
    fs::create_dir_all(dest_dir)?;
    let count = ZipUnarchiver.extract(archive, dest_dir, &filter)?;
    println!(
        "unpacked {} file(s) from {} into {}",
        count,
        archive.display(),
        dest_dir.display()
    );
    Ok(())
}
