//! Client Tests
//!
//! End-to-end runs through `Client`: tracker lookup, then the storage
//! operation against the node the lookup returned.

#[path = "../common/mod.rs"]
mod common;

use std::fs;
use std::io::Cursor;
use std::sync::Arc;
use std::thread;

use common::{pattern, MockCluster, GROUP};
use fdfs_client::{Client, Config, DownloadSink, FdfsError, FileId, UploadSource};
use tempfile::TempDir;

fn client(mock: &MockCluster) -> Client {
    Client::new(mock.config()).unwrap()
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_upload_then_download_roundtrip() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let content = pattern(100_000);

    let uploaded = client.upload_from_bytes(&content, "dat").unwrap();
    let id = uploaded.file_id().unwrap();
    let downloaded = client.download_to_buffer(&id, 0, 0).unwrap();

    assert_eq!(downloaded.size, content.len() as u64);
    assert_eq!(&downloaded.content[..], &content[..]);
    assert_eq!(downloaded.file_id, id);
    assert_eq!(mock.commands(), vec![101, 11, 111, 102, 14]);
}

#[test]
fn test_partial_download() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let content = pattern(10_000);

    let id = client.upload_from_bytes(&content, "").unwrap().file_id().unwrap();

    let slice = client.download_to_buffer(&id, 1234, 500).unwrap();
    assert_eq!(slice.size, 500);
    assert_eq!(&slice.content[..], &content[1234..1734]);

    let tail = client.download_to_buffer(&id, 9_000, 0).unwrap();
    assert_eq!(&tail.content[..], &content[9_000..]);
}

#[test]
fn test_upload_from_stream() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let content = pattern(3_000);
    let mut reader = Cursor::new(content.clone());

    let result = client
        .upload_from_stream(&mut reader, content.len() as u64, "log")
        .unwrap();

    assert!(result.remote_id.ends_with(".log"));
    assert_eq!(mock.file(&result.to_string()).unwrap(), content);
}

#[test]
fn test_upload_from_path_uses_file_extension() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.png");
    fs::write(&path, pattern(512)).unwrap();

    let result = client.upload_from_path(&path).unwrap();

    assert!(result.remote_id.ends_with(".png"));
    assert_eq!(mock.seen()[1].command, 11);
    assert_eq!(common::cstr(&mock.seen()[1].body[9..15]), "png");
}

#[test]
fn test_explicit_extension_overrides_path() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scan.png");
    fs::write(&path, b"x").unwrap();

    let result = client.upload(UploadSource::Path(&path), "jpg").unwrap();
    assert!(result.remote_id.ends_with(".jpg"));
}

#[test]
fn test_download_to_file() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let content = pattern(8_192);
    let id = client.upload_from_bytes(&content, "bin").unwrap().file_id().unwrap();
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out.bin");

    let written = client.download_to_file(&id, &target).unwrap();

    assert_eq!(written, 8_192);
    assert_eq!(fs::read(&target).unwrap(), content);
}

#[test]
fn test_download_appends_to_buffer_sink() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let id = client.upload_from_bytes(b"world", "").unwrap().file_id().unwrap();

    let mut buffer = b"hello ".to_vec();
    client
        .download(&id, DownloadSink::Buffer(&mut buffer), 0, 0)
        .unwrap();

    assert_eq!(buffer, b"hello world");
}

#[test]
fn test_delete_then_download_is_not_found() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let id = client.upload_from_bytes(b"short-lived", "").unwrap().file_id().unwrap();

    client.delete(&id).unwrap();

    let result = client.download_to_buffer(&id, 0, 0);
    assert!(matches!(result, Err(FdfsError::Status { code: 2 })));
    assert!(matches!(client.delete(&id), Err(FdfsError::Status { code: 2 })));
}

// =============================================================================
// Slave Upload Tests
// =============================================================================

#[test]
fn test_slave_upload_resolves_in_master_group() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let master = client
        .upload_from_bytes(b"full size", "jpg")
        .unwrap()
        .file_id()
        .unwrap();
    mock.clear_seen();

    let slave = client
        .upload_slave(UploadSource::Bytes(b"thumb"), &master, "_small", "jpg")
        .unwrap();

    let seen = mock.seen();
    let commands: Vec<i8> = seen.iter().map(|s| s.command).collect();
    assert!(!commands.contains(&101));
    let lookup = seen.iter().find(|s| s.command == 104).unwrap();
    assert_eq!(lookup.group_at(0), master.group());

    assert_eq!(slave.group_name, GROUP);
    let stem = master.path().trim_end_matches(".jpg");
    assert_eq!(slave.remote_id, format!("{}_small.jpg", stem));
    assert_eq!(mock.file(&slave.to_string()).unwrap(), b"thumb");
}

#[test]
fn test_slave_upload_to_unknown_group_fails() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let master = FileId::new("nogroup", "M00/00/00/x.jpg").unwrap();

    let result = client.upload_slave(UploadSource::Bytes(b"thumb"), &master, "_s", "jpg");

    assert!(matches!(result, Err(FdfsError::Status { code: 22 })));
    assert_eq!(mock.commands(), vec![104]);
}

#[test]
fn test_slave_prefix_too_long_is_rejected_locally() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let master = FileId::new(GROUP, "M00/00/00/x.jpg").unwrap();

    let result = client.upload_slave(
        UploadSource::Bytes(b"thumb"),
        &master,
        "_prefix_longer_than_16",
        "jpg",
    );

    assert!(matches!(result, Err(FdfsError::Validation(_))));
    assert!(mock.commands().is_empty());
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_missing_path_fails_before_any_request() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let dir = TempDir::new().unwrap();

    let result = client.upload_from_path(&dir.path().join("nope.txt"));

    assert!(matches!(result, Err(FdfsError::Validation(_))));
    assert!(mock.commands().is_empty());
}

#[test]
fn test_directory_is_not_uploadable() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let dir = TempDir::new().unwrap();

    let result = client.upload_from_path(dir.path());

    assert!(matches!(result, Err(FdfsError::Validation(_))));
    assert!(mock.commands().is_empty());
}

#[test]
fn test_long_extension_is_rejected() {
    let mock = MockCluster::start();
    let client = client(&mock);

    let result = client.upload_from_bytes(b"x", "toolong");

    assert!(matches!(result, Err(FdfsError::Validation(_))));
    assert!(mock.commands().is_empty());
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = Config::builder().max_connections(0).build();
    assert!(matches!(Client::new(config), Err(FdfsError::Config(_))));
}

// =============================================================================
// Lifecycle and Concurrency Tests
// =============================================================================

#[test]
fn test_close_fails_later_operations() {
    let mock = MockCluster::start();
    let client = client(&mock);
    let id = client.upload_from_bytes(b"kept", "").unwrap().file_id().unwrap();

    client.close();

    assert!(matches!(
        client.upload_from_bytes(b"more", ""),
        Err(FdfsError::Closed)
    ));
    assert!(matches!(client.download_to_buffer(&id, 0, 0), Err(FdfsError::Closed)));
    assert!(matches!(client.delete(&id), Err(FdfsError::Closed)));
}

#[test]
fn test_concurrent_uploads() {
    let mock = MockCluster::start();
    let client = Arc::new(client(&mock));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let client = Arc::clone(&client);
            thread::spawn(move || {
                let mut ids = Vec::new();
                for i in 0..10 {
                    let content = format!("thread {} object {}", t, i).into_bytes();
                    let id = loop {
                        match client.upload_from_bytes(&content, "txt") {
                            Ok(result) => break result.file_id().unwrap(),
                            Err(FdfsError::Capacity { .. }) => thread::yield_now(),
                            Err(e) => panic!("upload failed: {}", e),
                        }
                    };
                    ids.push((id, content));
                }
                ids
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.join().unwrap());
    }

    assert_eq!(all.len(), 40);
    for (id, content) in &all {
        assert_eq!(mock.file(&id.to_string()).unwrap(), *content);
    }
    assert!(client.pool().open_count() <= client.config().max_connections);
}
