//! TOML manifest: one repository plus the transfer items to run against it.
//!
//! Items are processed section by section in the order below: copy,
//! download, unpack, upload, upload_set; within a section, in file order.

use anyhow::{bail, Context, Result};
use artsync_core::config::SyncConfig;
use artsync_core::item::{GavCoordinate, TransferItem, UploadMethod};
use artsync_core::repo::{Credentials, HttpRepository, ProxyConfig};
use artsync_core::sync::{FailurePolicy, RunConfig};
use artsync_core::tracking::DEFAULT_TRACKING_FILENAME;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub repository: RepositorySection,
    #[serde(default)]
    pub run: RunSection,
    /// Root of a local repository layout; required when copy items exist.
    #[serde(default)]
    pub local_repository: Option<PathBuf>,
    #[serde(default)]
    pub copy: Vec<CopyEntry>,
    #[serde(default)]
    pub download: Vec<DownloadEntry>,
    #[serde(default)]
    pub unpack: Vec<UnpackEntry>,
    #[serde(default)]
    pub upload: Vec<UploadEntry>,
    #[serde(default, rename = "upload_set")]
    pub upload_sets: Vec<UploadSetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySection {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub proxy: Option<ProxySection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxySection {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_proxy_protocol")]
    pub protocol: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn default_proxy_protocol() -> String {
    "http".to_string()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Short-circuit the whole run: log the items and do nothing.
    #[serde(default)]
    pub skip: bool,
    /// Overrides the global `tracking_enabled` setting.
    pub tracking: Option<bool>,
    /// Overrides the tracking file location.
    pub tracking_file: Option<PathBuf>,
    /// Overrides the global failure policy.
    pub on_failure: Option<FailurePolicy>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyEntry {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub classifier: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub dest_dir: PathBuf,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DownloadEntry {
    pub uri: String,
    pub dest_dir: PathBuf,
    pub file_name: Option<String>,
    pub sha256: Option<String>,
    #[serde(default)]
    pub unpack: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnpackEntry {
    pub archive: PathBuf,
    pub dest_dir: PathBuf,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadEntry {
    pub file: PathBuf,
    pub server_path: String,
    #[serde(default)]
    pub method: UploadMethod,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub preemptive: bool,
    #[serde(default)]
    pub ignore_missing: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadSetEntry {
    pub base_dir: PathBuf,
    pub server_path: String,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub method: UploadMethod,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub preemptive: bool,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("read manifest {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("parse manifest {}", path.display()))
    }

    /// Repository descriptor for the whole run. Credentials must come in
    /// pairs; half a pair is a configuration mistake, not a default.
    pub fn repository(&self) -> Result<HttpRepository> {
        let mut repo = HttpRepository::new(self.repository.url.clone());
        if let Some(creds) =
            credentials(&self.repository.username, &self.repository.password, "repository")?
        {
            repo = repo.with_credentials(creds);
        }
        if let Some(section) = &self.repository.proxy {
            let mut proxy = ProxyConfig::new(section.host.clone(), section.port);
            proxy.protocol = section.protocol.clone();
            proxy.credentials = credentials(&section.username, &section.password, "proxy")?;
            repo = repo.with_proxy(proxy);
        }
        Ok(repo)
    }

    pub fn items(&self) -> Vec<TransferItem> {
        let mut items = Vec::new();
        for entry in &self.copy {
            let mut coordinate =
                GavCoordinate::new(entry.group_id.clone(), entry.artifact_id.clone());
            if let Some(version) = &entry.version {
                coordinate = coordinate.with_version(version.clone());
            }
            if let Some(classifier) = &entry.classifier {
                coordinate = coordinate.with_classifier(classifier.clone());
            }
            if let Some(kind) = &entry.kind {
                coordinate = coordinate.with_kind(kind.clone());
            }
            items.push(TransferItem::Copy {
                coordinate,
                dest_dir: entry.dest_dir.clone(),
                includes: entry.includes.clone(),
                excludes: entry.excludes.clone(),
            });
        }
        for entry in &self.download {
            items.push(TransferItem::Download {
                uri: entry.uri.clone(),
                dest_dir: entry.dest_dir.clone(),
                file_name: entry.file_name.clone(),
                sha256: entry.sha256.clone(),
                unpack: entry.unpack,
            });
        }
        for entry in &self.unpack {
            items.push(TransferItem::Unpack {
                archive: entry.archive.clone(),
                dest_dir: entry.dest_dir.clone(),
                includes: entry.includes.clone(),
                excludes: entry.excludes.clone(),
            });
        }
        for entry in &self.upload {
            items.push(TransferItem::Upload {
                file: entry.file.clone(),
                server_path: entry.server_path.clone(),
                method: entry.method,
                headers: header_pairs(&entry.headers),
                preemptive: entry.preemptive,
                ignore_missing: entry.ignore_missing,
            });
        }
        for entry in &self.upload_sets {
            items.push(TransferItem::UploadSet {
                base_dir: entry.base_dir.clone(),
                server_path: entry.server_path.clone(),
                includes: entry.includes.clone(),
                excludes: entry.excludes.clone(),
                method: entry.method,
                headers: header_pairs(&entry.headers),
                preemptive: entry.preemptive,
            });
        }
        items
    }

    /// Per-run options. Manifest settings win over the global config; the
    /// tracking file defaults to `artsync.tracking` next to the manifest.
    pub fn run_config(&self, cfg: &SyncConfig, manifest_path: &Path) -> RunConfig {
        let enabled = self.run.tracking.unwrap_or(cfg.tracking_enabled);
        let tracking_file = if enabled {
            self.run
                .tracking_file
                .clone()
                .or_else(|| cfg.tracking_file.clone())
                .or_else(|| {
                    let dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
                    Some(dir.join(DEFAULT_TRACKING_FILENAME))
                })
        } else {
            None
        };
        RunConfig {
            tracking_file,
            failure_policy: self.run.on_failure.unwrap_or(cfg.on_failure),
        }
    }
}

fn credentials(
    username: &Option<String>,
    password: &Option<String>,
    what: &str,
) -> Result<Option<Credentials>> {
    match (username, password) {
        (Some(user), Some(pass)) => Ok(Some(Credentials::new(user.clone(), pass.clone()))),
        (None, None) => Ok(None),
        _ => bail!("{} credentials need both username and password", what),
    }
}

fn header_pairs(headers: &BTreeMap<String, String>) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        local_repository = "/var/cache/repo"

        [repository]
        url = "https://repo.example.com/content/"
        username = "user01"
        password = "goodpass"

        [repository.proxy]
        host = "proxy.example.com"
        port = 3128

        [run]
        tracking_file = "markers/run.tracking"
        on_failure = "continue"

        [[copy]]
        group_id = "org.acme"
        artifact_id = "widget"
        version = "1.2.3"
        dest_dir = "out/libs"
        excludes = ["*:sources:*"]

        [[download]]
        uri = "https://downloads.example.com/tool.zip"
        dest_dir = "out/tools"
        sha256 = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        unpack = true

        [[unpack]]
        archive = "bundles/site.zip"
        dest_dir = "out/site"
        includes = ["docs/**"]

        [[upload]]
        file = "target/widget-1.2.3.jar"
        server_path = "releases/widget-1.2.3.jar"
        preemptive = true

        [[upload_set]]
        base_dir = "target/reports"
        server_path = "reports/widget"
        method = "post"
        excludes = ["**/*.tmp"]

        [upload_set.headers]
        "X-Build-Id" = "42"
    "#;

    #[test]
    fn full_manifest_parses() {
        let manifest: Manifest = toml::from_str(FULL).unwrap();
        assert_eq!(manifest.copy.len(), 1);
        assert_eq!(manifest.download.len(), 1);
        assert_eq!(manifest.unpack.len(), 1);
        assert_eq!(manifest.upload.len(), 1);
        assert_eq!(manifest.upload_sets.len(), 1);
        assert_eq!(
            manifest.local_repository.as_deref(),
            Some(Path::new("/var/cache/repo"))
        );
        assert_eq!(manifest.upload_sets[0].method, UploadMethod::Post);
        assert_eq!(
            manifest.upload_sets[0].headers.get("X-Build-Id").map(String::as_str),
            Some("42")
        );
    }

    #[test]
    fn items_preserve_section_order() {
        let manifest: Manifest = toml::from_str(FULL).unwrap();
        let items = manifest.items();
        assert_eq!(items.len(), 5);
        assert!(matches!(items[0], TransferItem::Copy { .. }));
        assert!(matches!(items[1], TransferItem::Download { .. }));
        assert!(matches!(items[2], TransferItem::Unpack { .. }));
        assert!(matches!(items[3], TransferItem::Upload { .. }));
        assert!(matches!(items[4], TransferItem::UploadSet { .. }));
        assert_eq!(items[0].identity(), "org.acme:widget:1.2.3:jar");
    }

    #[test]
    fn repository_builds_credentials_and_proxy() {
        let manifest: Manifest = toml::from_str(FULL).unwrap();
        let repo = manifest.repository().unwrap();
        assert_eq!(repo.base_url, "https://repo.example.com/content/");
        assert_eq!(repo.credentials.as_ref().unwrap().username, "user01");
        let proxy = repo.proxy.unwrap();
        assert_eq!(proxy.host, "proxy.example.com");
        assert_eq!(proxy.port, 3128);
        assert!(proxy.is_http());
        assert!(proxy.credentials.is_none());
    }

    #[test]
    fn half_a_credential_pair_is_rejected() {
        let manifest: Manifest = toml::from_str(
            r#"
            [repository]
            url = "https://repo.example.com/"
            username = "user01"
            "#,
        )
        .unwrap();
        let err = manifest.repository().unwrap_err();
        assert!(err.to_string().contains("username and password"));
    }

    #[test]
    fn minimal_manifest_uses_defaults() {
        let manifest: Manifest = toml::from_str(
            r#"
            [repository]
            url = "https://repo.example.com/"
            "#,
        )
        .unwrap();
        assert!(manifest.items().is_empty());
        let cfg = SyncConfig::default();
        let run = manifest.run_config(&cfg, Path::new("build/manifest.toml"));
        assert_eq!(
            run.tracking_file.as_deref(),
            Some(Path::new("build/artsync.tracking"))
        );
        assert_eq!(run.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn run_section_overrides_global_config() {
        let manifest: Manifest = toml::from_str(FULL).unwrap();
        let cfg = SyncConfig::default();
        let run = manifest.run_config(&cfg, Path::new("manifest.toml"));
        assert_eq!(
            run.tracking_file.as_deref(),
            Some(Path::new("markers/run.tracking"))
        );
        assert_eq!(run.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn skip_flag_parses_from_run_section() {
        let manifest: Manifest = toml::from_str(
            r#"
            [repository]
            url = "https://repo.example.com/"

            [run]
            skip = true
            "#,
        )
        .unwrap();
        assert!(manifest.run.skip);
        let full: Manifest = toml::from_str(FULL).unwrap();
        assert!(!full.run.skip);
    }

    #[test]
    fn tracking_can_be_disabled_per_manifest() {
        let manifest: Manifest = toml::from_str(
            r#"
            [repository]
            url = "https://repo.example.com/"

            [run]
            tracking = false
            "#,
        )
        .unwrap();
        let run = manifest.run_config(&SyncConfig::default(), Path::new("manifest.toml"));
        assert!(run.tracking_file.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = toml::from_str::<Manifest>(
            r#"
            [repository]
            url = "https://repo.example.com/"
            typo_key = true
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("typo_key"));
    }
}
