//! `artsync download <url>` – fetch a single file.

use anyhow::{bail, Context, Result};
use artsync_core::archive::{Unarchiver, ZipUnarchiver};
use artsync_core::config::SyncConfig;
use artsync_core::filter::PatternFilter;
use artsync_core::item;
use artsync_core::repo::{Credentials, HttpRepository};
use artsync_core::transfer::TransferClient;
use std::path::Path;

#[allow(clippy::too_many_arguments)]
pub fn run_download(
    cfg: &SyncConfig,
    url: &str,
    dest_dir: &Path,
    file_name: Option<String>,
    sha256: Option<String>,
    unpack: bool,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let name = file_name
        .or_else(|| item::file_name_from_uri(url))
        .with_context(|| format!("cannot derive a file name from {}, use --file-name", url))?;

    let mut repo = HttpRepository::new(url);
    match (username, password) {
        (Some(user), Some(pass)) => {
            repo = repo.with_credentials(Credentials::new(user, pass));
        }
        (None, None) => {}
        _ => bail!("--username and --password must be given together"),
    }
    let client = TransferClient::configure(repo, cfg.timeouts())?;

    let dest = dest_dir.join(&name);
    let outcome = client.download(url, &dest, sha256.as_deref())?;
    println!(
        "downloaded {} ({} bytes, sha256 {})",
        dest.display(),
        outcome.bytes,
        outcome.sha256
    );

    if unpack {
        let count = ZipUnarchiver
            .extract(&dest, dest_dir, &PatternFilter::accept_all())
            .with_context(|| format!("unpack {}", dest.display()))?;
        println!("unpacked {} file(s) into {}", count, dest_dir.display());
    }
    Ok(())
}
