//! Recording file system for exercising setting resolution
//!
//! Serves paths under its own schemes from local disk and records, per path,
//! the timeout and retry values the operation saw through its opener. Used
//! to pose as a remote backend (e.g. named `HTTPFileSystem`) in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::LocalFileSystem;
use scopefs_types::{
	category::OperationCategory,
	file_system::{FileHandle, FileSystem},
	opener::FileOpener,
	policy::RequestParams,
	prelude::*,
	types::{DirEntry, FileInfo, OpenFlags},
};

/// Settings one operation resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedParams {
	pub category: OperationCategory,
	/// Seconds
	pub timeout: u64,
	pub retries: u64,
	pub retry_wait_ms: u64,
	pub retry_backoff: f64,
}

#[derive(Debug)]
pub struct RecordFileSystem {
	name: String,
	prefixes: Vec<String>,
	inner: LocalFileSystem,
	recorded: Mutex<HashMap<String, RecordedParams>>,
}

impl RecordFileSystem {
	pub fn new() -> Self {
		Self::with_name("RecordFileSystem", &["record://"])
	}

	/// Recording file system reporting `name` and serving paths under `prefixes`
	pub fn with_name(name: &str, prefixes: &[&str]) -> Self {
		Self {
			name: name.to_string(),
			prefixes: prefixes.iter().map(ToString::to_string).collect(),
			inner: LocalFileSystem::new(),
			recorded: Mutex::new(HashMap::new()),
		}
	}

	fn split<'p>(&self, path: &'p str) -> ClResult<(&str, &'p str)> {
		self.prefixes
			.iter()
			.find_map(|prefix| path.strip_prefix(prefix.as_str()).map(|rest| (prefix.as_str(), rest)))
			.ok_or_else(|| Error::Internal(format!("{} cannot handle '{}'", self.name, path)))
	}

	fn to_local<'p>(&self, path: &'p str) -> ClResult<&'p str> {
		Ok(self.split(path)?.1)
	}

	/// Record the settings visible through `opener` for `path`
	pub fn record_params(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<()> {
		let Some(category) = opener.and_then(|opener| opener.category()) else {
			return Err(Error::Internal(format!(
				"{} received an opener not scoped to an operation category",
				self.name
			)));
		};
		let params = RequestParams::from_opener(opener)?;
		let retry_wait_ms = u64::try_from(params.retry_wait.as_millis()).unwrap_or(u64::MAX);
		let recorded = RecordedParams {
			category,
			timeout: params.policy.timeout.as_secs(),
			retries: params.policy.retries,
			retry_wait_ms,
			retry_backoff: params.retry_backoff,
		};
		debug!(path, ?recorded, "recorded params");
		self.recorded.lock().insert(path.to_string(), recorded);
		Ok(())
	}

	pub fn recorded_params(&self, path: &str) -> Option<RecordedParams> {
		self.recorded.lock().get(path).cloned()
	}

	pub fn all_recorded_params(&self) -> HashMap<String, RecordedParams> {
		self.recorded.lock().clone()
	}

	pub fn clear(&self) {
		self.recorded.lock().clear();
	}
}

impl Default for RecordFileSystem {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl FileSystem for RecordFileSystem {
	fn name(&self) -> String {
		self.name.clone()
	}

	async fn open_file(
		&self,
		path: &str,
		flags: OpenFlags,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<Box<dyn FileHandle>> {
		self.record_params(path, opener)?;
		self.inner.open_file(self.to_local(path)?, flags, opener).await
	}

	async fn list_files(
		&self,
		directory: &str,
		callback: &mut (dyn for<'e> FnMut(&'e DirEntry) + Send),
		opener: Option<FileOpener<'_>>,
	) -> ClResult<bool> {
		self.record_params(directory, opener)?;
		self.inner.list_files(self.to_local(directory)?, callback, opener).await
	}

	async fn glob(&self, pattern: &str, opener: Option<FileOpener<'_>>) -> ClResult<Vec<FileInfo>> {
		self.record_params(pattern, opener)?;
		let (prefix, local) = self.split(pattern)?;
		let found = self.inner.glob(local, opener).await?;
		Ok(found
			.into_iter()
			.map(|info| FileInfo { path: format!("{}{}", prefix, info.path).into(), ..info })
			.collect())
	}

	async fn remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<()> {
		self.record_params(path, opener)?;
		self.inner.remove_file(self.to_local(path)?, opener).await
	}

	async fn try_remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		self.record_params(path, opener)?;
		self.inner.try_remove_file(self.to_local(path)?, opener).await
	}

	async fn remove_directory(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		self.record_params(directory, opener)?;
		self.inner.remove_directory(self.to_local(directory)?, opener).await
	}

	async fn file_exists(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		self.record_params(path, opener)?;
		self.inner.file_exists(self.to_local(path)?, opener).await
	}

	async fn directory_exists(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<bool> {
		self.record_params(directory, opener)?;
		self.inner.directory_exists(self.to_local(directory)?, opener).await
	}

	async fn is_pipe(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		self.record_params(path, opener)?;
		self.inner.is_pipe(self.to_local(path)?, opener).await
	}

	async fn create_directory(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		self.record_params(directory, opener)?;
		self.inner.create_directory(self.to_local(directory)?, opener).await
	}

	async fn create_directories_recursive(
		&self,
		path: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		self.record_params(path, opener)?;
		self.inner.create_directories_recursive(self.to_local(path)?, opener).await
	}

	async fn move_file(
		&self,
		source: &str,
		target: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		self.record_params(source, opener)?;
		self.record_params(target, opener)?;
		self.inner.move_file(self.to_local(source)?, self.to_local(target)?, opener).await
	}

	fn can_handle_file(&self, path: &str) -> bool {
		self.split(path).is_ok()
	}

	fn can_seek(&self) -> bool {
		true
	}
}


// vim: ts=4
