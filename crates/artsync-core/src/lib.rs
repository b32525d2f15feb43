pub mod config;
pub mod logging;

pub mod archive;
pub mod checksum;
pub mod error;
pub mod filter;
pub mod item;
pub mod repo;
pub mod resolver;
pub mod sync;
pub mod tracking;
pub mod transfer;
