//! Tests for the upload, unpack and checksum subcommands.

use super::parse;
use crate::cli::CliCommand;
use std::path::Path;

#[test]
fn cli_parse_upload() {
    match parse(&[
        "artsync",
        "upload",
        "target/file1.txt",
        "releases/file1.txt",
        "--repo",
        "https://repo.example.com/",
    ]) {
        CliCommand::Upload {
            file,
            server_path,
            repo,
            method,
            headers,
            preemptive,
            ignore_missing,
            ..
        } => {
            assert_eq!(file, Path::new("target/file1.txt"));
            assert_eq!(server_path, "releases/file1.txt");
            assert_eq!(repo, "https://repo.example.com/");
            assert_eq!(method, "put");
            assert!(headers.is_empty());
            assert!(!preemptive);
            assert!(!ignore_missing);
        }
        _ => panic!("expected Upload"),
    }
}

#[test]
fn cli_parse_upload_options() {
    match parse(&[
        "artsync",
        "upload",
        "target/file1.txt",
        "releases/file1.txt",
        "--repo",
        "https://repo.example.com/",
        "--method",
        "post",
        "--header",
        "X-Build: 42",
        "--header",
        "X-Stage: final",
        "--preemptive",
        "--ignore-missing",
    ]) {
        CliCommand::Upload {
            method,
            headers,
            preemptive,
            ignore_missing,
            ..
        } => {
            assert_eq!(method, "post");
            assert_eq!(headers, vec!["X-Build: 42", "X-Stage: final"]);
            assert!(preemptive);
            assert!(ignore_missing);
        }
        _ => panic!("expected Upload with options"),
    }
}

#[test]
fn cli_parse_unpack() {
    match parse(&[
        "artsync",
        "unpack",
        "bundle.zip",
        "--dest-dir",
        "out",
        "--include",
        "docs/**",
        "--exclude",
        "**/*.tmp",
    ]) {
        CliCommand::Unpack {
            archive,
            dest_dir,
            includes,
            excludes,
        } => {
            assert_eq!(archive, Path::new("bundle.zip"));
            assert_eq!(dest_dir, Path::new("out"));
            assert_eq!(includes, vec!["docs/**"]);
            assert_eq!(excludes, vec!["**/*.tmp"]);
        }
        _ => panic!("expected Unpack"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["artsync", "checksum", "out/file1.txt"]) {
        CliCommand::Checksum { path } => assert_eq!(path, Path::new("out/file1.txt")),
        _ => panic!("expected Checksum"),
    }
}
