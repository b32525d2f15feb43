//! CLI command handlers, one file per command.

mod checksum;
mod download;
mod run;
mod unpack;
mod upload;

pub use checksum::run_checksum;
pub use download::run_download;
pub use run::run_manifest;
pub use unpack::run_unpack;
pub use upload::run_upload;
