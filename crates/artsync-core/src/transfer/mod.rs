//! Authenticated HTTP transfer over libcurl.
//!
//! One `TransferClient` is configured per run from an `HttpRepository`
//! descriptor and reused for every upload and download in that run. Proxy
//! credentials bind to the proxy's auth scope only; target credentials bind
//! to the target host. Both may be present on the same request.

mod download;
mod upload;

pub use download::DownloadOutcome;
pub use upload::UploadOutcome;

use crate::error::SyncError;
use crate::repo::HttpRepository;
use curl::easy::{Auth, Easy, ProxyType};
use std::time::Duration;

/// Bounded timeouts applied to every network operation.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            request: Duration::from_secs(300),
        }
    }
}

/// HTTP client bound to one repository descriptor.
#[derive(Debug)]
pub struct TransferClient {
    repo: HttpRepository,
    timeouts: Timeouts,
}

impl TransferClient {
    /// Build a client for one repository. A proxy with a protocol other than
    /// plain HTTP is a configuration error here, before any request is made.
    pub fn configure(repo: HttpRepository, timeouts: Timeouts) -> Result<Self, SyncError> {
        if let Some(proxy) = &repo.proxy {
            if !proxy.is_http() {
                return Err(SyncError::Config(format!(
                    "proxy protocol {:?} is not supported",
                    proxy.protocol
                )));
            }
        }
        Ok(Self { repo, timeouts })
    }

    pub fn repository(&self) -> &HttpRepository {
        &self.repo
    }

    /// Shared request setup: URL, redirects, timeouts, proxy routing, and
    /// both credential scopes.
    ///
    /// When `preemptive` is set, auth is pinned to Basic so libcurl sends the
    /// `Authorization` header with the first request instead of waiting for a
    /// 401 challenge. Callers must only enable this against trusted endpoints
    /// known to expect Basic auth. Otherwise auth negotiation is automatic
    /// (challenge-response).
    fn handle(&self, url: &str, preemptive: bool) -> Result<Easy, SyncError> {
        let mut easy = Easy::new();
        easy.url(url).map_err(|e| SyncError::network(url, e))?;
        easy.follow_location(true)
            .map_err(|e| SyncError::network(url, e))?;
        easy.max_redirections(10)
            .map_err(|e| SyncError::network(url, e))?;
        easy.connect_timeout(self.timeouts.connect)
            .map_err(|e| SyncError::network(url, e))?;
        easy.timeout(self.timeouts.request)
            .map_err(|e| SyncError::network(url, e))?;

        if let Some(creds) = &self.repo.credentials {
            easy.username(&creds.username)
                .map_err(|e| SyncError::network(url, e))?;
            easy.password(&creds.password)
                .map_err(|e| SyncError::network(url, e))?;
            let mut auth = Auth::new();
            if preemptive {
                auth.basic(true);
            } else {
                auth.auto(true);
            }
            easy.http_auth(&auth)
                .map_err(|e| SyncError::network(url, e))?;
        }

        if let Some(proxy) = &self.repo.proxy {
            easy.proxy(&proxy.host)
                .map_err(|e| SyncError::network(url, e))?;
            easy.proxy_port(proxy.port)
                .map_err(|e| SyncError::network(url, e))?;
            easy.proxy_type(ProxyType::Http)
                .map_err(|e| SyncError::network(url, e))?;
            if let Some(creds) = &proxy.credentials {
                easy.proxy_username(&creds.username)
                    .map_err(|e| SyncError::network(url, e))?;
                easy.proxy_password(&creds.password)
                    .map_err(|e| SyncError::network(url, e))?;
                let mut auth = Auth::new();
                auth.auto(true);
                easy.proxy_auth(&auth)
                    .map_err(|e| SyncError::network(url, e))?;
            }
        }

        Ok(easy)
    }
}
