//! Remote repository descriptor: base URL, credentials, optional proxy.
//!
//! Built once per run and handed to `TransferClient::configure`; all
//! transfers in that run share it.

use std::fmt;

/// Username/password pair for Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Passwords must never reach logs in cleartext, so Debug redacts them.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Proxy descriptor. Only plain HTTP proxies are supported; anything else is
/// rejected when the client is configured rather than silently downgraded.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    /// Proxy protocol as configured, e.g. "http". Compared case-insensitively.
    pub protocol: String,
    /// Credentials scoped to the proxy itself, distinct from the target's.
    pub credentials: Option<Credentials>,
}

impl ProxyConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            protocol: "http".to_string(),
            credentials: None,
        }
    }

    pub fn is_http(&self) -> bool {
        self.protocol.eq_ignore_ascii_case("http")
    }
}

/// One remote repository endpoint.
#[derive(Debug, Clone)]
pub struct HttpRepository {
    pub base_url: String,
    /// Credentials for the target host (reactive or preemptive Basic auth).
    pub credentials: Option<Credentials>,
    pub proxy: Option<ProxyConfig>,
}

impl HttpRepository {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: None,
            proxy: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Join a server path onto the base URL, inserting a slash when neither
    /// side carries one.
    pub fn target_url(&self, server_path: &str) -> String {
        let mut url = self.base_url.clone();
        if !url.ends_with('/') && !server_path.starts_with('/') {
            url.push('/');
        }
        url.push_str(server_path);
        url
    }
}
