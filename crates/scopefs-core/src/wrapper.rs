//! File system wrapper that scopes every operation to its category
//!
//! Each category-scoped operation hands the inner backend a
//! [`SettingResolver`] for that operation's [`OperationCategory`]:
//!
//! - an opener that is already scoped is passed through as is, so a caller
//!   that chose a category explicitly keeps it,
//! - a plain opener is wrapped,
//! - no opener at all is replaced by a fresh database-wide source built by
//!   the injected [`SourceFactory`], then wrapped.
//!
//! Everything else delegates to the inner backend untouched. Errors of the
//! inner backend are returned unchanged; no retries happen at this layer.

use async_trait::async_trait;
use std::sync::Arc;

use crate::database::{Database, DatabaseSource};
use crate::prelude::*;
use scopefs_types::category::OperationCategory;
use scopefs_types::file_system::{FileHandle, FileSystem};
use scopefs_types::opener::{FileOpener, SettingResolver};
use scopefs_types::setting_source::SettingSource;
use scopefs_types::types::{DirEntry, FileInfo, OpenFlags};

pub const NAME_PREFIX: &str = "CategoryAwareFileSystem - ";

/// Builds the default setting source for calls made without one
pub type SourceFactory = Arc<dyn Fn() -> Box<dyn SettingSource> + Send + Sync>;

/// Category-scoped file system operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOperation {
	OpenFile,
	ListFiles,
	Glob,
	RemoveFile,
	TryRemoveFile,
	RemoveDirectory,
	FileExists,
	DirectoryExists,
	IsPipe,
	CreateDirectory,
	CreateDirectoriesRecursive,
	MoveFile,
}

impl FsOperation {
	pub fn category(self) -> OperationCategory {
		match self {
			FsOperation::OpenFile => OperationCategory::Open,
			FsOperation::ListFiles | FsOperation::Glob => OperationCategory::List,
			FsOperation::RemoveFile | FsOperation::TryRemoveFile | FsOperation::RemoveDirectory => {
				OperationCategory::Delete
			}
			FsOperation::FileExists | FsOperation::DirectoryExists | FsOperation::IsPipe => {
				OperationCategory::Stat
			}
			FsOperation::CreateDirectory | FsOperation::CreateDirectoriesRecursive => {
				OperationCategory::CreateDir
			}
			FsOperation::MoveFile => OperationCategory::Write,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			FsOperation::OpenFile => "open_file",
			FsOperation::ListFiles => "list_files",
			FsOperation::Glob => "glob",
			FsOperation::RemoveFile => "remove_file",
			FsOperation::TryRemoveFile => "try_remove_file",
			FsOperation::RemoveDirectory => "remove_directory",
			FsOperation::FileExists => "file_exists",
			FsOperation::DirectoryExists => "directory_exists",
			FsOperation::IsPipe => "is_pipe",
			FsOperation::CreateDirectory => "create_directory",
			FsOperation::CreateDirectoriesRecursive => "create_directories_recursive",
			FsOperation::MoveFile => "move_file",
		}
	}
}

impl std::fmt::Display for FsOperation {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

pub struct CategoryAwareFileSystem {
	inner: Arc<dyn FileSystem>,
	default_source: SourceFactory,
}

impl std::fmt::Debug for CategoryAwareFileSystem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CategoryAwareFileSystem").field("inner", &self.inner).finish()
	}
}

impl CategoryAwareFileSystem {
	pub fn new(inner: Arc<dyn FileSystem>, default_source: SourceFactory) -> Self {
		Self { inner, default_source }
	}

	/// Wrap `inner`, defaulting to the database-wide settings of `db`
	pub fn for_database(inner: Arc<dyn FileSystem>, db: &Database) -> Self {
		let config = Arc::clone(db.config());
		let http_util = Arc::clone(db.http_util());
		let factory: SourceFactory = Arc::new(move || {
			Box::new(DatabaseSource::new(Arc::clone(&config), Arc::clone(&http_util)))
		});
		Self::new(inner, factory)
	}

	pub fn inner(&self) -> &Arc<dyn FileSystem> {
		&self.inner
	}

	/// Name a file system registered as `inner` has once wrapped
	pub fn wrapped_name(inner: &str) -> String {
		format!("{}{}", NAME_PREFIX, inner)
	}

	/// Whether `name` is the name of a wrapped file system
	pub fn is_wrapped_name(name: &str) -> bool {
		name.starts_with(NAME_PREFIX)
	}
}

/// Binds `$scoped` to an opener scoped to `$op`'s category and evaluates
/// `$body` with it. The resolver and the default source live in the calling
/// frame so `$scoped` can borrow them across the inner await.
macro_rules! with_scope {
	($self:ident, $op:expr, $opener:ident, |$scoped:ident| $body:expr) => {{
		let op: FsOperation = $op;
		let category = op.category();
		let default_source: Box<dyn SettingSource>;
		let resolver: SettingResolver<'_>;
		let $scoped = match $opener {
			Some(opener) => match opener.resolver() {
				Some(outer) => {
					debug!(%op, category = %outer.category(), "opener already scoped");
					FileOpener::Scoped(outer)
				}
				None => {
					resolver = SettingResolver::new(opener.source(), category);
					FileOpener::Scoped(&resolver)
				}
			},
			None => {
				default_source = ($self.default_source)();
				resolver = SettingResolver::new(default_source.as_ref(), category);
				FileOpener::Scoped(&resolver)
			}
		};
		$body
	}};
}

#[async_trait]
impl FileSystem for CategoryAwareFileSystem {
	fn name(&self) -> String {
		Self::wrapped_name(&self.inner.name())
	}

	async fn open_file(
		&self,
		path: &str,
		flags: OpenFlags,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<Box<dyn FileHandle>> {
		with_scope!(self, FsOperation::OpenFile, opener, |scoped| {
			self.inner.open_file(path, flags, Some(scoped)).await
		})
	}

	async fn list_files(
		&self,
		directory: &str,
		callback: &mut (dyn for<'e> FnMut(&'e DirEntry) + Send),
		opener: Option<FileOpener<'_>>,
	) -> ClResult<bool> {
		with_scope!(self, FsOperation::ListFiles, opener, |scoped| {
			self.inner.list_files(directory, callback, Some(scoped)).await
		})
	}

	async fn glob(&self, pattern: &str, opener: Option<FileOpener<'_>>) -> ClResult<Vec<FileInfo>> {
		with_scope!(self, FsOperation::Glob, opener, |scoped| {
			self.inner.glob(pattern, Some(scoped)).await
		})
	}

	async fn remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<()> {
		with_scope!(self, FsOperation::RemoveFile, opener, |scoped| {
			self.inner.remove_file(path, Some(scoped)).await
		})
	}

	async fn try_remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		with_scope!(self, FsOperation::TryRemoveFile, opener, |scoped| {
			self.inner.try_remove_file(path, Some(scoped)).await
		})
	}

	async fn remove_directory(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		with_scope!(self, FsOperation::RemoveDirectory, opener, |scoped| {
			self.inner.remove_directory(directory, Some(scoped)).await
		})
	}

	async fn file_exists(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		with_scope!(self, FsOperation::FileExists, opener, |scoped| {
			self.inner.file_exists(path, Some(scoped)).await
		})
	}

	async fn directory_exists(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<bool> {
		with_scope!(self, FsOperation::DirectoryExists, opener, |scoped| {
			self.inner.directory_exists(directory, Some(scoped)).await
		})
	}

	async fn is_pipe(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		with_scope!(self, FsOperation::IsPipe, opener, |scoped| {
			self.inner.is_pipe(path, Some(scoped)).await
		})
	}

	async fn create_directory(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		with_scope!(self, FsOperation::CreateDirectory, opener, |scoped| {
			self.inner.create_directory(directory, Some(scoped)).await
		})
	}

	async fn create_directories_recursive(
		&self,
		path: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		with_scope!(self, FsOperation::CreateDirectoriesRecursive, opener, |scoped| {
			self.inner.create_directories_recursive(path, Some(scoped)).await
		})
	}

	async fn move_file(
		&self,
		source: &str,
		target: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		with_scope!(self, FsOperation::MoveFile, opener, |scoped| {
			self.inner.move_file(source, target, Some(scoped)).await
		})
	}

	// Pass-through
	//**************

	fn can_handle_file(&self, path: &str) -> bool {
		self.inner.can_handle_file(path)
	}

	fn path_separator(&self, path: &str) -> &'static str {
		self.inner.path_separator(path)
	}

	fn expand_path(&self, path: &str) -> String {
		self.inner.expand_path(path)
	}

	fn home_directory(&self) -> Option<String> {
		self.inner.home_directory()
	}

	fn can_seek(&self) -> bool {
		self.inner.can_seek()
	}

	fn on_disk_file(&self, handle: &dyn FileHandle) -> bool {
		self.inner.on_disk_file(handle)
	}

	fn is_manually_set(&self) -> bool {
		self.inner.is_manually_set()
	}

	fn register_sub_system(&self, sub_fs: Arc<dyn FileSystem>) -> ClResult<()> {
		self.inner.register_sub_system(sub_fs)
	}

	fn unregister_sub_system(&self, name: &str) -> ClResult<()> {
		self.inner.unregister_sub_system(name)
	}

	fn extract_sub_system(&self, name: &str) -> Option<Arc<dyn FileSystem>> {
		self.inner.extract_sub_system(name)
	}

	fn list_sub_systems(&self) -> Vec<String> {
		self.inner.list_sub_systems()
	}

	fn set_disabled_file_systems(&self, names: &[String]) -> ClResult<()> {
		self.inner.set_disabled_file_systems(names)
	}

	fn sub_system_is_disabled(&self, name: &str) -> bool {
		self.inner.sub_system_is_disabled(name)
	}
}


// vim: ts=4
