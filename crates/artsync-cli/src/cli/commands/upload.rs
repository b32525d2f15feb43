//! `artsync upload <file> <server-path>` – push a single file.

use anyhow::{bail, Context, Result};
use artsync_core::config::SyncConfig;
use artsync_core::item::UploadMethod;
use artsync_core::repo::{Credentials, HttpRepository};
use artsync_core::transfer::TransferClient;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub fn run_upload(
    cfg: &SyncConfig,
    file: &Path,
    server_path: &str,
    repo_url: &str,
    method: &str,
    headers: &[String],
    preemptive: bool,
    ignore_missing: bool,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    if ignore_missing && !file.exists() {
        tracing::info!("file does not exist, ignoring {}", file.display());
        println!("skipped missing {}", file.display());
        return Ok(());
    }

    let method = parse_method(method)?;
    let headers = parse_headers(headers)?;

    let mut repo = HttpRepository::new(repo_url);
    match (username, password) {
        (Some(user), Some(pass)) => {
            repo = repo.with_credentials(Credentials::new(user, pass));
        }
        (None, None) => {}
        _ => bail!("--username and --password must be given together"),
    }
    let client = TransferClient::configure(repo, cfg.timeouts())?;

    let outcome = client.upload(file, server_path, method, &headers, preemptive)?;
    println!(
        "uploaded {} ({} bytes, HTTP {})",
        file.display(),
        outcome.bytes_sent,
        outcome.status
    );
    Ok(())
}

fn parse_method(raw: &str) -> Result<UploadMethod> {
    match raw.to_ascii_lowercase().as_str() {
        "put" => Ok(UploadMethod::Put),
        "post" => Ok(UploadMethod::Post),
        other => bail!("unknown method {:?}, expected \"put\" or \"post\"", other),
    }
}

/// Parse repeated `--header "Name: Value"` arguments.
fn parse_headers(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|header| {
            let (name, value) = header
                .split_once(':')
                .with_context(|| format!("header {:?} is not \"Name: Value\"", header))?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!(parse_method("put").unwrap(), UploadMethod::Put);
        assert_eq!(parse_method("POST").unwrap(), UploadMethod::Post);
        assert!(parse_method("patch").is_err());
    }

    #[test]
    fn headers_split_on_first_colon() {
        let parsed = parse_headers(&["X-Build: 42".to_string()]).unwrap();
        assert_eq!(parsed, vec![("X-Build".to_string(), "42".to_string())]);
        let parsed = parse_headers(&["Time: 12:30".to_string()]).unwrap();
        assert_eq!(parsed[0].1, "12:30");
        assert!(parse_headers(&["no-colon".to_string()]).is_err());
    }
}
