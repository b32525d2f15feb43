//! `artsync run <manifest>` – process every item in a manifest.

use crate::cli::manifest::Manifest;
use anyhow::{bail, Result};
use artsync_core::archive::ZipUnarchiver;
use artsync_core::config::SyncConfig;
use artsync_core::item::TransferItem;
use artsync_core::resolver::LayoutResolver;
use artsync_core::sync;
use artsync_core::transfer::TransferClient;
use std::path::Path;

pub fn run_manifest(cfg: &SyncConfig, manifest_path: &Path, skip: bool) -> Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let items = manifest.items();

    if skip || manifest.run.skip {
        tracing::info!("skip flag set, {} item(s) left untouched", items.len());
        for item in &items {
            println!("would process {}", item.identity());
        }
        return Ok(());
    }

    let has_copy_items = items
        .iter()
        .any(|item| matches!(item, TransferItem::Copy { .. }));
    let resolver = match &manifest.local_repository {
        Some(root) => LayoutResolver::new(root.clone()),
        None if has_copy_items => {
            bail!("manifest has copy items but no local_repository")
        }
        // Never consulted without copy items.
        None => LayoutResolver::new("."),
    };

    let client = TransferClient::configure(manifest.repository()?, cfg.timeouts())?;
    let run_config = manifest.run_config(cfg, manifest_path);

    let summary = sync::run(&items, &run_config, &client, &resolver, &ZipUnarchiver)?;
    println!(
        "{} completed, {} skipped, {} failed",
        summary.completed.len(),
        summary.skipped.len(),
        summary.failed.len()
    );
    for (identity, err) in &summary.failed {
        eprintln!("failed {}: {:#}", identity, err);
    }
    if !summary.is_success() {
        bail!("{} item(s) failed", summary.failed.len());
    }
    Ok(())
}
