//! Global configuration loaded from `~/.config/artsync/config.toml`.

use crate::sync::FailurePolicy;
use crate::transfer::Timeouts;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Track completed identities so repeat runs skip them.
    pub tracking_enabled: bool,
    /// Override for the tracking file location. When absent, callers place
    /// `artsync.tracking` next to their output.
    #[serde(default)]
    pub tracking_file: Option<PathBuf>,
    /// Connect timeout per network operation, seconds.
    pub connect_timeout_secs: u64,
    /// Total timeout per network operation, seconds.
    pub request_timeout_secs: u64,
    /// Whether one failing item aborts the run ("abort") or the run keeps
    /// going ("continue").
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tracking_enabled: true,
            tracking_file: None,
            connect_timeout_secs: 30,
            request_timeout_secs: 300,
            on_failure: FailurePolicy::default(),
        }
    }
}

impl SyncConfig {
    pub fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_secs(self.connect_timeout_secs),
            request: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("artsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: SyncConfig = toml::from_str(&data)?;
    Ok(cfg)
}
