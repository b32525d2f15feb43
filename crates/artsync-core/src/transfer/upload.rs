//! Streaming PUT/POST upload with status mapping and body capture.

use super::TransferClient;
use crate::error::SyncError;
use crate::item::UploadMethod;
use curl::easy::{List, ReadError, SeekResult};
use std::cell::RefCell;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

/// Result of an accepted upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub status: u32,
    pub bytes_sent: u64,
}

impl TransferClient {
    /// Upload `file` to `server_path` joined onto the repository base URL.
    ///
    /// The body streams from disk. `.xml` files are sent as
    /// `application/xml`, everything else as `application/octet-stream`;
    /// caller headers are applied after the defaults so a caller-supplied
    /// `Content-Type` (or anything else) wins. Any status outside [200,299]
    /// fails with `UploadRejected` carrying the captured response body.
    pub fn upload(
        &self,
        file: &Path,
        server_path: &str,
        method: UploadMethod,
        headers: &[(String, String)],
        preemptive: bool,
    ) -> Result<UploadOutcome, SyncError> {
        let url = self.repo.target_url(server_path);
        let mut source = File::open(file).map_err(|e| SyncError::io(file, e))?;
        let size = source
            .metadata()
            .map_err(|e| SyncError::io(file, e))?
            .len();

        tracing::info!("uploading {} to {} ({})", file.display(), url, method.as_str());

        let mut easy = self.handle(&url, preemptive)?;
        match method {
            UploadMethod::Put => {
                easy.upload(true).map_err(|e| SyncError::network(&url, e))?;
                easy.in_filesize(size)
                    .map_err(|e| SyncError::network(&url, e))?;
            }
            UploadMethod::Post => {
                easy.post(true).map_err(|e| SyncError::network(&url, e))?;
                easy.post_field_size(size)
                    .map_err(|e| SyncError::network(&url, e))?;
            }
        }

        let mut list = List::new();
        for (name, value) in request_headers(file, headers) {
            list.append(&format!("{}: {}", name.trim(), value.trim()))
                .map_err(|e| SyncError::network(&url, e))?;
        }
        easy.http_headers(list)
            .map_err(|e| SyncError::network(&url, e))?;

        // Reactive auth may need to resend the body after a 401 challenge,
        // so the source is shared between the read and seek callbacks.
        let source = RefCell::new(source);
        let mut body = Vec::new();
        let read_err: RefCell<Option<std::io::Error>> = RefCell::new(None);
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .read_function(|into| match source.borrow_mut().read(into) {
                    Ok(n) => Ok(n),
                    Err(e) => {
                        *read_err.borrow_mut() = Some(e);
                        Err(ReadError::Abort)
                    }
                })
                .map_err(|e| SyncError::network(&url, e))?;
            transfer
                .seek_function(|from| match source.borrow_mut().seek(from) {
                    Ok(_) => SeekResult::Ok,
                    Err(_) => SeekResult::Fail,
                })
                .map_err(|e| SyncError::network(&url, e))?;
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(|e| SyncError::network(&url, e))?;
            transfer.perform()
        };
        if let Err(e) = performed {
            if let Some(io_err) = read_err.into_inner() {
                return Err(SyncError::io(file, io_err));
            }
            return Err(SyncError::network(&url, e));
        }

        let status = easy
            .response_code()
            .map_err(|e| SyncError::network(&url, e))?;
        if !(200..300).contains(&status) {
            return Err(SyncError::UploadRejected {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        tracing::info!("uploaded {} ({} bytes, HTTP {})", url, size, status);
        Ok(UploadOutcome {
            status,
            bytes_sent: size,
        })
    }
}

/// Default headers first, caller headers after; a caller header replaces a
/// default of the same (case-insensitive) name.
fn request_headers(file: &Path, custom: &[(String, String)]) -> Vec<(String, String)> {
    let content_type = if file
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
    {
        "application/xml"
    } else {
        "application/octet-stream"
    };
    let mut all: Vec<(String, String)> =
        vec![("Content-Type".to_string(), content_type.to_string())];
    for (name, value) in custom {
        all.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        all.push((name.clone(), value.clone()));
    }
    all
}
