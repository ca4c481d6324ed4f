//! Adapter traits every file system backend implements
//!
//! Operations that can reach a remote service take an optional
//! [`FileOpener`]; backends read their timeout and retry policy through it
//! (see [`crate::policy::RequestParams`]) instead of hardcoding values.
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::opener::FileOpener;
use crate::prelude::*;
use crate::types::{DirEntry, FileInfo, FileType, OpenFlags};

/// An open file. Handle operations use the policy captured when the handle
/// was opened.
#[async_trait]
pub trait FileHandle: Debug + Send + Sync {
	fn path(&self) -> &str;

	/// Reads at the current position, advancing it
	async fn read(&mut self, buf: &mut [u8]) -> ClResult<usize>;

	/// Reads exactly `buf.len()` bytes starting at `location`
	async fn read_at(&mut self, buf: &mut [u8], location: u64) -> ClResult<()>;

	/// Writes at the current position, advancing it
	async fn write(&mut self, data: &[u8]) -> ClResult<usize>;

	/// Writes all of `data` starting at `location`
	async fn write_at(&mut self, data: &[u8], location: u64) -> ClResult<()>;

	async fn file_size(&mut self) -> ClResult<u64>;

	async fn last_modified(&mut self) -> ClResult<Timestamp>;

	async fn file_type(&mut self) -> ClResult<FileType>;

	/// Opaque version tag (e.g. an ETag); empty when the backend has none
	async fn version_tag(&mut self) -> ClResult<String> {
		Ok(String::new())
	}

	async fn sync(&mut self) -> ClResult<()>;

	async fn truncate(&mut self, new_size: u64) -> ClResult<()>;

	async fn seek(&mut self, location: u64) -> ClResult<()>;

	async fn reset(&mut self) -> ClResult<()> {
		self.seek(0).await
	}

	async fn position(&mut self) -> ClResult<u64>;
}

#[async_trait]
pub trait FileSystem: Debug + Send + Sync {
	fn name(&self) -> String;

	// Category-scoped operations
	//****************************

	/// Opens a handle for reading or writing
	async fn open_file(
		&self,
		path: &str,
		flags: OpenFlags,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<Box<dyn FileHandle>>;

	/// Lists the entries of `directory`, calling `callback` for each.
	/// Returns false if the directory does not exist.
	async fn list_files(
		&self,
		directory: &str,
		callback: &mut (dyn for<'e> FnMut(&'e DirEntry) + Send),
		opener: Option<FileOpener<'_>>,
	) -> ClResult<bool>;

	/// Expands a wildcard pattern
	async fn glob(&self, pattern: &str, opener: Option<FileOpener<'_>>) -> ClResult<Vec<FileInfo>>;

	async fn remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<()>;

	/// Removes `path` if it exists; returns whether something was removed
	async fn try_remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool>;

	async fn remove_directory(&self, directory: &str, opener: Option<FileOpener<'_>>)
	-> ClResult<()>;

	async fn file_exists(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool>;

	async fn directory_exists(&self, directory: &str, opener: Option<FileOpener<'_>>)
	-> ClResult<bool>;

	async fn is_pipe(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool>;

	async fn create_directory(&self, directory: &str, opener: Option<FileOpener<'_>>)
	-> ClResult<()>;

	async fn create_directories_recursive(
		&self,
		path: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()>;

	async fn move_file(
		&self,
		source: &str,
		target: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()>;

	// Pass-through operations
	//*************************

	fn can_handle_file(&self, path: &str) -> bool;

	fn path_separator(&self, _path: &str) -> &'static str {
		"/"
	}

	fn expand_path(&self, path: &str) -> String {
		path.to_string()
	}

	fn home_directory(&self) -> Option<String> {
		None
	}

	fn can_seek(&self) -> bool {
		false
	}

	fn on_disk_file(&self, _handle: &dyn FileHandle) -> bool {
		false
	}

	/// Whether the file system was registered explicitly rather than by default
	fn is_manually_set(&self) -> bool {
		false
	}

	fn register_sub_system(&self, _sub_fs: Arc<dyn FileSystem>) -> ClResult<()> {
		Err(Error::NotImplemented)
	}

	fn unregister_sub_system(&self, _name: &str) -> ClResult<()> {
		Err(Error::NotImplemented)
	}

	fn extract_sub_system(&self, _name: &str) -> Option<Arc<dyn FileSystem>> {
		None
	}

	fn list_sub_systems(&self) -> Vec<String> {
		Vec::new()
	}

	fn set_disabled_file_systems(&self, _names: &[String]) -> ClResult<()> {
		Err(Error::NotImplemented)
	}

	fn sub_system_is_disabled(&self, _name: &str) -> bool {
		false
	}
}

// vim: ts=4
