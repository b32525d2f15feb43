//! Streaming GET with inline SHA-256 verification.

use super::TransferClient;
use crate::checksum;
use crate::error::SyncError;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Result of a completed download.
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub status: u32,
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the body, computed while streaming.
    pub sha256: String,
}

impl TransferClient {
    /// Download `url` to `dest`, hashing the body as it streams.
    ///
    /// When `expected_sha256` is given and does not match, the file is
    /// removed and the download fails with `ChecksumMismatch`; a partial or
    /// corrupt file is never left looking complete. Non-2xx responses also
    /// remove the partial file.
    pub fn download(
        &self,
        url: &str,
        dest: &Path,
        expected_sha256: Option<&str>,
    ) -> Result<DownloadOutcome, SyncError> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        let mut out = File::create(dest).map_err(|e| SyncError::io(dest, e))?;

        tracing::info!("downloading {} to {}", url, dest.display());

        let mut easy = self.handle(url, false)?;
        easy.get(true).map_err(|e| SyncError::network(url, e))?;

        let mut hasher = Sha256::new();
        let mut bytes = 0u64;
        let mut write_err: Option<std::io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match out.write_all(data) {
                    Ok(()) => {
                        hasher.update(data);
                        bytes += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(|e| SyncError::network(url, e))?;
            transfer.perform()
        };
        if let Err(e) = performed {
            let _ = fs::remove_file(dest);
            if let Some(io_err) = write_err {
                return Err(SyncError::io(dest, io_err));
            }
            return Err(SyncError::network(url, e));
        }

        let status = easy
            .response_code()
            .map_err(|e| SyncError::network(url, e))?;
        if !(200..300).contains(&status) {
            let _ = fs::remove_file(dest);
            return Err(SyncError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }

        out.flush().map_err(|e| SyncError::io(dest, e))?;
        let digest = hex::encode(hasher.finalize());
        if let Some(expected) = expected_sha256 {
            if let Err(e) = checksum::verify_digest(expected, &digest) {
                let _ = fs::remove_file(dest);
                return Err(e);
            }
        }

        tracing::info!("downloaded {} ({} bytes, HTTP {})", url, bytes, status);
        Ok(DownloadOutcome {
            status,
            bytes,
            sha256: digest,
        })
    }
}
