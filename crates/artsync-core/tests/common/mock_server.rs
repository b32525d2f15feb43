//! Minimal HTTP/1.1 server for transfer tests.
//!
//! Records every request it sees and can demand an exact Authorization
//! header for non-GET methods (401 otherwise), mirroring a repository that
//! requires Basic auth for writes.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// `user01:goodpass` in the Basic scheme.
pub const BASIC_AUTH: &str = "Basic dXNlcjAxOmdvb2RwYXNz";

/// `proxyuser:proxypass` in the Basic scheme.
pub const PROXY_BASIC_AUTH: &str = "Basic cHJveHl1c2VyOnByb3h5cGFzcw==";

/// One request as seen by the server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct MockServerOptions {
    /// Exact Authorization value required for PUT/POST; absence or mismatch
    /// yields 401 with a Basic challenge.
    pub required_auth: Option<String>,
    /// Exact Proxy-Authorization value required for every request; absence
    /// or mismatch yields 407 with a Basic challenge. Turns the server into
    /// a plain HTTP forward proxy (clients send absolute URIs).
    pub required_proxy_auth: Option<String>,
    /// Status for accepted PUT requests.
    pub put_status: u32,
    /// Status for accepted POST requests.
    pub post_status: u32,
    /// Status for GET requests.
    pub get_status: u32,
    /// Body served for 2xx GET responses.
    pub get_body: Vec<u8>,
}

impl Default for MockServerOptions {
    fn default() -> Self {
        Self {
            required_auth: None,
            required_proxy_auth: None,
            put_status: 204,
            post_status: 201,
            get_status: 200,
            get_body: Vec::new(),
        }
    }
}

pub struct MockServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub url: String,
    /// Bound port, for clients that address the server as a proxy.
    pub port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    /// Starts a server in a background thread. It runs until the process
    /// exits.
    pub fn start(opts: MockServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();
        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let opts = opts.clone();
                let log = Arc::clone(&log);
                thread::spawn(move || handle(stream, &opts, &log));
            }
        });
        Self {
            url: format!("http://127.0.0.1:{}/", port),
            port,
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn handle(mut stream: TcpStream, opts: &MockServerOptions, log: &Mutex<Vec<RecordedRequest>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));

    // Read until the end of the header block.
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
        match stream.read(&mut chunk) {
            Ok(0) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => return,
        }
    };

    let head = match std::str::from_utf8(&buf[..header_end]) {
        Ok(s) => s.to_string(),
        Err(_) => return,
    };
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    if headers
        .get("expect")
        .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"))
    {
        let _ = stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n");
    }

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
    }
    body.truncate(content_length);

    log.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path,
        headers: headers.clone(),
        body,
    });

    if let Some(expected) = &opts.required_proxy_auth {
        let authorized =
            headers.get("proxy-authorization").map(String::as_str) == Some(expected.as_str());
        if !authorized {
            let _ = stream.write_all(
                b"HTTP/1.1 407 Proxy Authentication Required\r\n\
                  Proxy-Authenticate: Basic realm=\"artsync-proxy\"\r\n\
                  Content-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    }

    if opts.required_auth.is_some() && !method.eq_ignore_ascii_case("GET") {
        let authorized = headers.get("authorization").map(String::as_str)
            == opts.required_auth.as_deref();
        if !authorized {
            let _ = stream.write_all(
                b"HTTP/1.1 401 Unauthorized\r\n\
                  WWW-Authenticate: Basic realm=\"artsync-test\"\r\n\
                  Content-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    }

    let (status, payload): (u32, &[u8]) = if method.eq_ignore_ascii_case("GET") {
        let payload: &[u8] = if (200..300).contains(&opts.get_status) {
            &opts.get_body
        } else {
            b""
        };
        (opts.get_status, payload)
    } else if method.eq_ignore_ascii_case("PUT") {
        (opts.put_status, b"")
    } else if method.eq_ignore_ascii_case("POST") {
        (opts.post_status, b"")
    } else {
        (405, b"")
    };

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        payload.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(payload);
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn reason(status: u32) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        401 => "Unauthorized",
        404 => "Not Found",
        407 => "Proxy Authentication Required",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Status",
    }
}
