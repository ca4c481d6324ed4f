//! Virtual file system dispatching paths to named sub-systems

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::sync::Arc;

use crate::prelude::*;
use crate::wrapper::NAME_PREFIX;
use scopefs_types::file_system::{FileHandle, FileSystem};
use scopefs_types::opener::FileOpener;
use scopefs_types::types::{DirEntry, FileInfo, OpenFlags};

pub struct VirtualFileSystem {
	default_fs: Option<Arc<dyn FileSystem>>,
	sub_systems: RwLock<Vec<Arc<dyn FileSystem>>>,
	disabled: RwLock<HashSet<String>>,
}

impl std::fmt::Debug for VirtualFileSystem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("VirtualFileSystem")
			.field("default_fs", &self.default_fs.as_ref().map(|fs| fs.name()))
			.field("sub_systems", &self.list_sub_systems())
			.finish()
	}
}

impl VirtualFileSystem {
	pub fn new(default_fs: Option<Arc<dyn FileSystem>>) -> Self {
		Self { default_fs, sub_systems: RwLock::new(Vec::new()), disabled: RwLock::new(HashSet::new()) }
	}

	/// A wrapped sub-system stays disabled under the name it was disabled by
	fn is_disabled(disabled: &HashSet<String>, name: &str) -> bool {
		disabled.contains(name) || name.strip_prefix(NAME_PREFIX).is_some_and(|inner| disabled.contains(inner))
	}

	/// File system responsible for `path`
	fn find(&self, path: &str) -> ClResult<Arc<dyn FileSystem>> {
		let sub_fs = self.sub_systems.read().iter().find(|fs| fs.can_handle_file(path)).cloned();
		match sub_fs {
			Some(fs) => {
				let name = fs.name();
				if Self::is_disabled(&self.disabled.read(), &name) {
					return Err(Error::ConfigError(format!(
						"File system '{}' has been disabled by configuration",
						name
					)));
				}
				Ok(fs)
			}
			None => self
				.default_fs
				.clone()
				.ok_or_else(|| Error::ConfigError(format!("No file system can handle '{}'", path))),
		}
	}
}

#[async_trait]
impl FileSystem for VirtualFileSystem {
	fn name(&self) -> String {
		"VirtualFileSystem".into()
	}

	async fn open_file(
		&self,
		path: &str,
		flags: OpenFlags,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<Box<dyn FileHandle>> {
		self.find(path)?.open_file(path, flags, opener).await
	}

	async fn list_files(
		&self,
		directory: &str,
		callback: &mut (dyn for<'e> FnMut(&'e DirEntry) + Send),
		opener: Option<FileOpener<'_>>,
	) -> ClResult<bool> {
		self.find(directory)?.list_files(directory, callback, opener).await
	}

	async fn glob(&self, pattern: &str, opener: Option<FileOpener<'_>>) -> ClResult<Vec<FileInfo>> {
		self.find(pattern)?.glob(pattern, opener).await
	}

	async fn remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<()> {
		self.find(path)?.remove_file(path, opener).await
	}

	async fn try_remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		self.find(path)?.try_remove_file(path, opener).await
	}

	async fn remove_directory(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		self.find(directory)?.remove_directory(directory, opener).await
	}

	async fn file_exists(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		self.find(path)?.file_exists(path, opener).await
	}

	async fn directory_exists(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<bool> {
		self.find(directory)?.directory_exists(directory, opener).await
	}

	async fn is_pipe(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		self.find(path)?.is_pipe(path, opener).await
	}

	async fn create_directory(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		self.find(directory)?.create_directory(directory, opener).await
	}

	async fn create_directories_recursive(
		&self,
		path: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		self.find(path)?.create_directories_recursive(path, opener).await
	}

	async fn move_file(
		&self,
		source: &str,
		target: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		self.find(source)?.move_file(source, target, opener).await
	}

	fn can_handle_file(&self, path: &str) -> bool {
		self.find(path).is_ok()
	}

	fn path_separator(&self, path: &str) -> &'static str {
		self.find(path).map_or("/", |fs| fs.path_separator(path))
	}

	fn expand_path(&self, path: &str) -> String {
		self.find(path).map_or_else(|_| path.to_string(), |fs| fs.expand_path(path))
	}

	fn home_directory(&self) -> Option<String> {
		self.default_fs.as_ref().and_then(|fs| fs.home_directory())
	}

	fn can_seek(&self) -> bool {
		self.default_fs.as_ref().is_some_and(|fs| fs.can_seek())
	}

	fn on_disk_file(&self, handle: &dyn FileHandle) -> bool {
		self.find(handle.path()).is_ok_and(|fs| fs.on_disk_file(handle))
	}

	fn register_sub_system(&self, sub_fs: Arc<dyn FileSystem>) -> ClResult<()> {
		let name = sub_fs.name();
		let mut sub_systems = self.sub_systems.write();
		if sub_systems.iter().any(|fs| fs.name() == name) {
			return Err(Error::ConfigError(format!("File system '{}' is already registered", name)));
		}
		debug!("Registered file system '{}'", name);
		sub_systems.push(sub_fs);
		Ok(())
	}

	fn unregister_sub_system(&self, name: &str) -> ClResult<()> {
		let mut sub_systems = self.sub_systems.write();
		let pos = sub_systems
			.iter()
			.position(|fs| fs.name() == name)
			.ok_or_else(|| Error::ConfigError(format!("No file system named '{}'", name)))?;
		sub_systems.remove(pos);
		debug!("Unregistered file system '{}'", name);
		Ok(())
	}

	fn extract_sub_system(&self, name: &str) -> Option<Arc<dyn FileSystem>> {
		let mut sub_systems = self.sub_systems.write();
		let pos = sub_systems.iter().position(|fs| fs.name() == name)?;
		Some(sub_systems.remove(pos))
	}

	fn list_sub_systems(&self) -> Vec<String> {
		self.sub_systems.read().iter().map(|fs| fs.name()).collect()
	}

	fn set_disabled_file_systems(&self, names: &[String]) -> ClResult<()> {
		let mut disabled = HashSet::new();
		for name in names.iter().filter(|name| !name.is_empty()) {
			if !disabled.insert(name.clone()) {
				return Err(Error::ConfigError(format!("Duplicate disabled file system '{}'", name)));
			}
		}
		info!("Disabled file systems: {:?}", disabled);
		*self.disabled.write() = disabled;
		Ok(())
	}

	fn sub_system_is_disabled(&self, name: &str) -> bool {
		Self::is_disabled(&self.disabled.read(), name)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use scopefs_fs_adapter_local::LocalFileSystem;
	use scopefs_fs_adapter_local::record::RecordFileSystem;

	fn vfs() -> VirtualFileSystem {
		let vfs = VirtualFileSystem::new(Some(Arc::new(LocalFileSystem::new())));
		let http = RecordFileSystem::with_name("HTTPFileSystem", &["http://", "https://"]);
		let s3 = RecordFileSystem::with_name("S3FileSystem", &["s3://"]);
		assert!(vfs.register_sub_system(Arc::new(http)).is_ok());
		assert!(vfs.register_sub_system(Arc::new(s3)).is_ok());
		vfs
	}

	#[test]
	fn test_registry() {
		let vfs = vfs();
		assert_eq!(vfs.list_sub_systems(), vec!["HTTPFileSystem", "S3FileSystem"]);

		let dup = RecordFileSystem::with_name("S3FileSystem", &["s3://"]);
		assert!(matches!(vfs.register_sub_system(Arc::new(dup)), Err(Error::ConfigError(_))));

		let extracted = vfs.extract_sub_system("HTTPFileSystem");
		assert_eq!(extracted.map(|fs| fs.name()).as_deref(), Some("HTTPFileSystem"));
		assert!(vfs.extract_sub_system("HTTPFileSystem").is_none());

		assert!(vfs.unregister_sub_system("S3FileSystem").is_ok());
		assert!(matches!(vfs.unregister_sub_system("S3FileSystem"), Err(Error::ConfigError(_))));
		assert!(vfs.list_sub_systems().is_empty());
	}

	#[test]
	fn test_dispatch_and_disable() {
		let vfs = vfs();
		assert!(vfs.find("s3://bucket/key").is_ok_and(|fs| fs.name() == "S3FileSystem"));
		assert!(vfs.find("/tmp/file").is_ok_and(|fs| fs.name() == "LocalFileSystem"));

		assert!(vfs.set_disabled_file_systems(&["S3FileSystem".to_string()]).is_ok());
		assert!(vfs.sub_system_is_disabled("S3FileSystem"));
		assert!(vfs.sub_system_is_disabled("CategoryAwareFileSystem - S3FileSystem"));
		assert!(matches!(vfs.find("s3://bucket/key"), Err(Error::ConfigError(_))));
		assert!(!vfs.can_handle_file("s3://bucket/key"));

		let dup = ["a".to_string(), "a".to_string()];
		assert!(matches!(vfs.set_disabled_file_systems(&dup), Err(Error::ConfigError(_))));
		assert!(vfs.set_disabled_file_systems(&[]).is_ok());
		assert!(vfs.can_handle_file("s3://bucket/key"));
	}

	#[test]
	fn test_no_default() {
		let vfs = VirtualFileSystem::new(None);
		assert!(matches!(vfs.find("/tmp/file"), Err(Error::ConfigError(_))));
		assert_eq!(vfs.path_separator("/tmp/file"), "/");
	}
}

// vim: ts=4
