//! Local file system error handling tests
//!
//! Tests error conditions and edge cases

use scopefs_fs_adapter_local::LocalFileSystem;
use scopefs_types::error::Error;
use scopefs_types::file_system::FileSystem;
use scopefs_types::types::{DirEntry, OpenFlags};
use tempfile::TempDir;

fn create_test_fs() -> (LocalFileSystem, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	(LocalFileSystem::new(), temp_dir)
}

fn path_in(temp: &TempDir, name: &str) -> String {
	temp.path().join(name).to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_open_missing_file() {
	let (fs, temp) = create_test_fs();
	let result = fs.open_file(&path_in(&temp, "missing"), OpenFlags::READ, None).await;
	assert!(matches!(result, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_remove_missing_file() {
	let (fs, temp) = create_test_fs();
	let path = path_in(&temp, "missing");

	assert!(matches!(fs.remove_file(&path, None).await, Err(Error::NotFound)));
	// try_remove_file treats a missing file as nothing to do
	assert!(!fs.try_remove_file(&path, None).await.expect("Failed to try remove"));
}

#[tokio::test]
async fn test_list_missing_directory() {
	let (fs, temp) = create_test_fs();
	let mut called = false;
	let found = fs
		.list_files(&path_in(&temp, "missing"), &mut |_: &DirEntry| called = true, None)
		.await
		.expect("Listing a missing directory should not fail");
	assert!(!found);
	assert!(!called);
}

#[tokio::test]
async fn test_create_existing_directory() {
	let (fs, temp) = create_test_fs();
	let dir = path_in(&temp, "dir");
	fs.create_directory(&dir, None).await.expect("Failed to create dir");

	let result = fs.create_directory(&dir, None).await;
	assert!(matches!(result, Err(Error::Io(_))));
	// The recursive variant accepts existing directories
	fs.create_directories_recursive(&dir, None).await.expect("Failed to create dirs");
}

#[tokio::test]
async fn test_read_past_end() {
	let (fs, temp) = create_test_fs();
	let path = path_in(&temp, "short.txt");
	tokio::fs::write(&path, b"abc").await.expect("Failed to write");

	let mut handle = fs.open_file(&path, OpenFlags::READ, None).await.expect("Failed to open");
	let mut buf = [0u8; 8];
	let result = handle.read_at(&mut buf, 0).await;
	assert!(matches!(result, Err(Error::Io(_))));
}

#[tokio::test]
async fn test_write_to_read_only_handle() {
	let (fs, temp) = create_test_fs();
	let path = path_in(&temp, "ro.txt");
	tokio::fs::write(&path, b"abc").await.expect("Failed to write");

	let mut handle = fs.open_file(&path, OpenFlags::READ, None).await.expect("Failed to open");
	assert!(matches!(handle.write_at(b"x", 0).await, Err(Error::Io(_))));
	assert!(matches!(handle.write(b"x").await, Err(Error::Io(_))));
	drop(handle);

	let content = tokio::fs::read(&path).await.expect("Failed to read back");
	assert_eq!(content, b"abc");
}

#[tokio::test]
async fn test_write_reaches_disk_without_sync() {
	let (fs, temp) = create_test_fs();
	let path = path_in(&temp, "unsynced.txt");

	let mut handle = fs
		.open_file(&path, OpenFlags::WRITE.create(), None)
		.await
		.expect("Failed to create file");
	handle.write_at(b"hello", 0).await.expect("Failed to write");

	let content = tokio::fs::read(&path).await.expect("Failed to read back");
	assert_eq!(content, b"hello");
}

#[tokio::test]
async fn test_glob_wildcard_in_directory() {
	let (fs, temp) = create_test_fs();
	let result = fs.glob(&path_in(&temp, "*/data.csv"), None).await;
	assert!(matches!(result, Err(Error::ValidationError(_))));
}

#[tokio::test]
async fn test_glob_missing_directory() {
	let (fs, temp) = create_test_fs();
	let found = fs.glob(&path_in(&temp, "missing/*.csv"), None).await.expect("Failed to glob");
	assert!(found.is_empty());
}

#[tokio::test]
async fn test_move_missing_file() {
	let (fs, temp) = create_test_fs();
	let result = fs.move_file(&path_in(&temp, "a"), &path_in(&temp, "b"), None).await;
	assert!(matches!(result, Err(Error::NotFound)));
}

// vim: ts=4
