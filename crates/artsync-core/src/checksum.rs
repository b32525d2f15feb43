//! SHA-256 hashing and verification for transferred files.
//!
//! Downloads hash the body while it streams (see `transfer::download`); this
//! module covers hashing files at rest and comparing digests.

use crate::error::SyncError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded for large artifacts.
pub fn sha256_path(path: &Path) -> Result<String, SyncError> {
    let mut f = File::open(path).map_err(|e| SyncError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf).map_err(|e| SyncError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Verify that `path` hashes to `expected` (hex, compared case-insensitively).
pub fn verify_path(path: &Path, expected: &str) -> Result<(), SyncError> {
    let actual = sha256_path(path)?;
    verify_digest(expected, &actual)
}

/// Compare an expected hex digest against a computed one.
pub fn verify_digest(expected: &str, actual: &str) -> Result<(), SyncError> {
    if expected.eq_ignore_ascii_case(actual) {
        Ok(())
    } else {
        Err(SyncError::ChecksumMismatch {
            expected: expected.to_ascii_lowercase(),
            actual: actual.to_string(),
        })
    }
}
