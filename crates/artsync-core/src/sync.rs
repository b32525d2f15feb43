//! Orchestrator: tracking-aware processing of transfer items.
//!
//! Per item the state machine is Pending -> (Skip | InProgress) ->
//! (Completed | Failed). Skip decisions consult only the tracking snapshot
//! loaded at run start; completions land in a separate in-memory set that is
//! flushed once at run end. An identity repeated within one run is attempted
//! only once.

use crate::archive::Unarchiver;
use crate::error::SyncError;
use crate::filter::{self, PatternFilter};
use crate::item::TransferItem;
use crate::resolver::Resolver;
use crate::tracking::TrackingSet;
use crate::transfer::TransferClient;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// What to do when an item fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the run on the first failing item. Nothing is flushed to the
    /// tracking file, so completed-but-unflushed items are re-processed on
    /// the next run (re-processing over data loss).
    #[default]
    Abort,
    /// Log the failure, move on, flush completions at run end.
    Continue,
}

/// Per-run orchestration options, passed in explicitly.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Tracking file path; `None` disables tracking entirely.
    pub tracking_file: Option<PathBuf>,
    pub failure_policy: FailurePolicy,
}

/// Per-item results of one run, in processing order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, SyncError)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Run every item through the tracking/transfer pipeline.
///
/// All include/exclude patterns are compiled before anything else, so a bad
/// pattern aborts before any network or filesystem activity.
pub fn run(
    items: &[TransferItem],
    config: &RunConfig,
    client: &TransferClient,
    resolver: &dyn Resolver,
    unarchiver: &dyn Unarchiver,
) -> Result<RunSummary, SyncError> {
    let filters = compile_filters(items)?;

    let loaded = match &config.tracking_file {
        Some(path) => TrackingSet::load(path)?,
        None => TrackingSet::new(),
    };
    let mut recorded = loaded.clone();

    let mut summary = RunSummary::default();
    let mut seen_this_run: HashSet<String> = HashSet::new();

    for (item, item_filter) in items.iter().zip(&filters) {
        let identity = item.identity();

        // Skip decisions use only the snapshot loaded at run start; mid-run
        // completions never feed back into them.
        if config.tracking_file.is_some() && loaded.contains(&identity) {
            tracing::info!("skipping already processed {}", identity);
            summary.skipped.push(identity);
            continue;
        }
        if !seen_this_run.insert(identity.clone()) {
            tracing::debug!("duplicate identity {} in run, already attempted", identity);
            continue;
        }

        tracing::info!("processing {}", identity);
        match process_item(item, item_filter, client, resolver, unarchiver) {
            Ok(()) => {
                recorded.insert(&identity);
                summary.completed.push(identity);
            }
            Err(err) => match config.failure_policy {
                FailurePolicy::Abort => {
                    tracing::error!("item {} failed: {}", identity, err);
                    return Err(err);
                }
                FailurePolicy::Continue => {
                    tracing::error!("item {} failed, continuing: {}", identity, err);
                    summary.failed.push((identity, err));
                }
            },
        }
    }

    if let Some(path) = &config.tracking_file {
        if !recorded.is_empty() {
            recorded.flush(path)?;
        }
    }

    Ok(summary)
}

fn compile_filters(items: &[TransferItem]) -> Result<Vec<PatternFilter>, SyncError> {
    items
        .iter()
        .map(|item| {
            let (includes, excludes) = item.patterns();
            PatternFilter::compile(includes, excludes)
        })
        .collect()
}

fn process_item(
    item: &TransferItem,
    item_filter: &PatternFilter,
    client: &TransferClient,
    resolver: &dyn Resolver,
    unarchiver: &dyn Unarchiver,
) -> Result<(), SyncError> {
    match item {
        TransferItem::Copy {
            coordinate,
            dest_dir,
            ..
        } => {
            let artifacts = resolver.resolve(coordinate).map_err(|e| SyncError::Resolve {
                coordinate: coordinate.to_string(),
                source: e.into(),
            })?;
            for artifact in artifacts {
                if !item_filter.accepts(&artifact.coordinate) {
                    tracing::debug!("filtered out {}", artifact.coordinate);
                    continue;
                }
                copy_file(&artifact.path, &dest_dir.join(&artifact.file_name))?;
            }
            Ok(())
        }
        TransferItem::Download {
            uri,
            dest_dir,
            file_name,
            sha256,
            unpack,
        } => {
            let name = file_name
                .clone()
                .or_else(|| crate::item::file_name_from_uri(uri))
                .ok_or_else(|| {
                    SyncError::Config(format!("cannot derive a file name from {}", uri))
                })?;
            let dest = dest_dir.join(name);
            client.download(uri, &dest, sha256.as_deref())?;
            if *unpack {
                unarchiver
                    .extract(&dest, dest_dir, &PatternFilter::accept_all())
                    .map_err(|e| SyncError::Extract {
                        path: dest.clone(),
                        source: e.into(),
                    })?;
            }
            Ok(())
        }
        TransferItem::Unpack {
            archive, dest_dir, ..
        } => {
            fs::create_dir_all(dest_dir).map_err(|e| SyncError::io(dest_dir, e))?;
            unarchiver
                .extract(archive, dest_dir, item_filter)
                .map_err(|e| SyncError::Extract {
                    path: archive.clone(),
                    source: e.into(),
                })?;
            Ok(())
        }
        TransferItem::Upload {
            file,
            server_path,
            method,
            headers,
            preemptive,
            ignore_missing,
        } => {
            if *ignore_missing && !file.exists() {
                tracing::info!("file does not exist, ignoring {}", file.display());
                return Ok(());
            }
            client.upload(file, server_path, *method, headers, *preemptive)?;
            Ok(())
        }
        TransferItem::UploadSet {
            base_dir,
            server_path,
            method,
            headers,
            preemptive,
            ..
        } => {
            let mut files = Vec::new();
            collect_files(base_dir, Path::new(""), &mut files)?;
            files.sort();
            let mut uploaded = 0usize;
            for rel in files {
                let key = filter::normalize_path(&rel);
                if !item_filter.accepts(&key) {
                    continue;
                }
                let target = format!("{}/{}", server_path.trim_end_matches('/'), key);
                client.upload(&base_dir.join(&rel), &target, *method, headers, *preemptive)?;
                uploaded += 1;
            }
            if uploaded == 0 {
                tracing::info!("no files matched under {}", base_dir.display());
            }
            Ok(())
        }
    }
}

fn copy_file(src: &Path, dest: &Path) -> Result<(), SyncError> {
    tracing::info!("copying {} to {}", src.display(), dest.display());
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }
    fs::copy(src, dest).map_err(|e| SyncError::io(dest, e))?;
    Ok(())
}

/// Walk `base/rel` recursively, pushing file paths relative to `base`.
fn collect_files(base: &Path, rel: &Path, out: &mut Vec<PathBuf>) -> Result<(), SyncError> {
    let dir = base.join(rel);
    let entries = fs::read_dir(&dir).map_err(|e| SyncError::io(&dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| SyncError::io(&dir, e))?;
        let entry_rel = rel.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| SyncError::io(&dir, e))?;
        if file_type.is_dir() {
            collect_files(base, &entry_rel, out)?;
        } else if file_type.is_file() {
            out.push(entry_rel);
        }
    }
    Ok(())
}
