//! CLI for the artsync artifact transfer toolkit.

mod commands;
mod manifest;

use anyhow::Result;
use clap::{Parser, Subcommand};
use artsync_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_download, run_manifest, run_unpack, run_upload};

/// Top-level CLI for the artsync artifact transfer toolkit.
#[derive(Debug, Parser)]
#[command(name = "artsync")]
#[command(about = "artsync: tracked artifact transfer for build pipelines", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Process every item in a manifest file, skipping tracked ones.
    Run {
        /// Path to the TOML manifest.
        manifest: PathBuf,

        /// Do nothing: log each item that would run and exit successfully.
        #[arg(long)]
        skip: bool,
    },

    /// Download a single file by URL.
    Download {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        /// Directory the file lands in.
        #[arg(long, default_value = ".", value_name = "DIR")]
        dest_dir: PathBuf,

        /// Target file name; derived from the URL path when absent.
        #[arg(long)]
        file_name: Option<String>,

        /// Expected SHA-256 digest; mismatch fails and removes the file.
        #[arg(long)]
        sha256: Option<String>,

        /// Extract the downloaded archive into the destination directory.
        #[arg(long)]
        unpack: bool,

        /// Username for Basic authentication.
        #[arg(long)]
        username: Option<String>,

        /// Password for Basic authentication.
        #[arg(long)]
        password: Option<String>,
    },

    /// Upload a single file to a repository path.
    Upload {
        /// Local file to upload.
        file: PathBuf,

        /// Server path relative to the repository base URL.
        server_path: String,

        /// Repository base URL.
        #[arg(long, value_name = "URL")]
        repo: String,

        /// HTTP method, "put" or "post".
        #[arg(long, default_value = "put")]
        method: String,

        /// Extra request header, "Name: Value". Repeatable.
        #[arg(long = "header", value_name = "HEADER")]
        headers: Vec<String>,

        /// Send the Basic Authorization header on the first request instead
        /// of waiting for a 401 challenge.
        #[arg(long)]
        preemptive: bool,

        /// Treat a missing local file as a logged no-op.
        #[arg(long)]
        ignore_missing: bool,

        /// Username for Basic authentication.
        #[arg(long)]
        username: Option<String>,

        /// Password for Basic authentication.
        #[arg(long)]
        password: Option<String>,
    },

    /// Extract a local zip archive with optional entry filtering.
    Unpack {
        /// Archive to extract.
        archive: PathBuf,

        /// Directory entries are written into.
        #[arg(long, default_value = ".", value_name = "DIR")]
        dest_dir: PathBuf,

        /// Glob pattern an entry must match to be extracted. Repeatable.
        #[arg(long = "include", value_name = "PATTERN")]
        includes: Vec<String>,

        /// Glob pattern that rejects matching entries. Repeatable.
        #[arg(long = "exclude", value_name = "PATTERN")]
        excludes: Vec<String>,
    },

    /// Compute SHA-256 of a file (e.g. before an upload).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run { manifest, skip } => run_manifest(&cfg, &manifest, skip)?,
            CliCommand::Download {
                url,
                dest_dir,
                file_name,
                sha256,
                unpack,
                username,
                password,
            } => run_download(
                &cfg, &url, &dest_dir, file_name, sha256, unpack, username, password,
            )?,
            CliCommand::Upload {
                file,
                server_path,
                repo,
                method,
                headers,
                preemptive,
                ignore_missing,
                username,
                password,
            } => run_upload(
                &cfg,
                &file,
                &server_path,
                &repo,
                &method,
                &headers,
                preemptive,
                ignore_missing,
                username,
                password,
            )?,
            CliCommand::Unpack {
                archive,
                dest_dir,
                includes,
                excludes,
            } => run_unpack(&archive, &dest_dir, &includes, &excludes)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
