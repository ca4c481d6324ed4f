//! Local disk file system adapter
//!
//! Every operation reads its timeout from the opener it was handed and is
//! cut off with [`Error::Timeout`] once it runs longer. A zero timeout means
//! no limit. Local I/O is not retried.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

use std::io::SeekFrom;
use std::path::Path;

use async_trait::async_trait;
use tokio::{
	fs::{self, File, OpenOptions},
	io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::Instrument;

use scopefs_types::{
	file_system::{FileHandle, FileSystem},
	opener::FileOpener,
	policy::RequestParams,
	prelude::*,
	types::{DirEntry, FileInfo, FileType, OpenFlags},
};

#[cfg(feature = "record")]
pub mod record;

const FILE_SCHEME: &str = "file://";

/// Strips an optional `file://` scheme
fn local_path(path: &str) -> &str {
	path.strip_prefix(FILE_SCHEME).unwrap_or(path)
}

fn has_wildcard(pattern: &str) -> bool {
	pattern.contains(['*', '?', '['])
}

fn compile_pattern(pattern: &str) -> ClResult<glob::Pattern> {
	glob::Pattern::new(pattern).map_err(|err| {
		Error::ValidationError(format!("Invalid glob pattern '{}': {}", pattern, err.msg))
	})
}

fn file_type_of(ft: std::fs::FileType) -> FileType {
	#[cfg(unix)]
	{
		use std::os::unix::fs::FileTypeExt;
		if ft.is_fifo() {
			return FileType::Fifo;
		}
		if ft.is_socket() {
			return FileType::Socket;
		}
		if ft.is_char_device() {
			return FileType::CharDevice;
		}
		if ft.is_block_device() {
			return FileType::BlockDevice;
		}
	}
	if ft.is_symlink() {
		FileType::Symlink
	} else if ft.is_dir() {
		FileType::Directory
	} else if ft.is_file() {
		FileType::Regular
	} else {
		FileType::Invalid
	}
}

/// Runs `fut` under the timeout and logging span of `opener`
async fn bounded<T, F>(op: &'static str, path: &str, opener: Option<FileOpener<'_>>, fut: F) -> ClResult<T>
where
	F: Future<Output = ClResult<T>> + Send,
{
	let params = RequestParams::from_opener(opener)?;
	let span = opener.map_or_else(tracing::Span::current, |opener| opener.source().span());
	let timeout = params.policy.timeout;

	async move {
		debug!(op, path, ?timeout, category = ?opener.and_then(|o| o.category()), "local fs");
		if timeout.is_zero() {
			return fut.await;
		}
		match tokio::time::timeout(timeout, fut).await {
			Ok(res) => res,
			Err(_) => {
				warn!(op, path, ?timeout, "local fs operation timed out");
				Err(Error::Timeout)
			}
		}
	}
	.instrument(span)
	.await
}

// LocalFileHandle //
//*****************//
#[derive(Debug)]
pub struct LocalFileHandle {
	path: String,
	file: File,
}

#[async_trait]
impl FileHandle for LocalFileHandle {
	fn path(&self) -> &str {
		&self.path
	}

	async fn read(&mut self, buf: &mut [u8]) -> ClResult<usize> {
		Ok(self.file.read(buf).await?)
	}

	async fn read_at(&mut self, buf: &mut [u8], location: u64) -> ClResult<()> {
		self.file.seek(SeekFrom::Start(location)).await?;
		self.file.read_exact(buf).await?;
		Ok(())
	}

	async fn write(&mut self, data: &[u8]) -> ClResult<usize> {
		let written = self.file.write(data).await?;
		self.file.flush().await?;
		Ok(written)
	}

	async fn write_at(&mut self, data: &[u8], location: u64) -> ClResult<()> {
		self.file.seek(SeekFrom::Start(location)).await?;
		self.file.write_all(data).await?;
		self.file.flush().await?;
		Ok(())
	}

	async fn file_size(&mut self) -> ClResult<u64> {
		Ok(self.file.metadata().await?.len())
	}

	async fn last_modified(&mut self) -> ClResult<Timestamp> {
		Ok(Timestamp::from_system_time(self.file.metadata().await?.modified()?))
	}

	async fn file_type(&mut self) -> ClResult<FileType> {
		Ok(file_type_of(self.file.metadata().await?.file_type()))
	}

	async fn sync(&mut self) -> ClResult<()> {
		self.file.flush().await?;
		self.file.sync_all().await?;
		Ok(())
	}

	async fn truncate(&mut self, new_size: u64) -> ClResult<()> {
		self.file.set_len(new_size).await?;
		Ok(())
	}

	async fn seek(&mut self, location: u64) -> ClResult<()> {
		self.file.seek(SeekFrom::Start(location)).await?;
		Ok(())
	}

	async fn position(&mut self) -> ClResult<u64> {
		Ok(self.file.stream_position().await?)
	}
}

// LocalFileSystem //
//*****************//
#[derive(Debug, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
	pub fn new() -> Self {
		Self
	}

	async fn stat(path: &str) -> ClResult<Option<std::fs::Metadata>> {
		match fs::metadata(local_path(path)).await {
			Ok(meta) => Ok(Some(meta)),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
			Err(err) => Err(err.into()),
		}
	}

	async fn glob_impl(pattern: &str) -> ClResult<Vec<FileInfo>> {
		let local = local_path(pattern);
		if !has_wildcard(local) {
			return Ok(match Self::stat(local).await? {
				Some(meta) => vec![FileInfo {
					path: pattern.into(),
					size: Some(meta.len()),
					last_modified: meta.modified().ok().map(Timestamp::from_system_time),
				}],
				None => Vec::new(),
			});
		}

		let (dir, name_pattern) = match local.rfind('/') {
			Some(pos) => (&local[..=pos], &local[pos + 1..]),
			None => ("", local),
		};
		if has_wildcard(dir) {
			return Err(Error::ValidationError(format!(
				"Wildcards are only supported in the last path component: {}",
				pattern
			)));
		}

		let matcher = compile_pattern(name_pattern)?;

		let mut read_dir = match fs::read_dir(if dir.is_empty() { "." } else { dir }).await {
			Ok(read_dir) => read_dir,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(err) => return Err(err.into()),
		};

		let mut found = Vec::new();
		while let Some(entry) = read_dir.next_entry().await? {
			let name = entry.file_name().to_string_lossy().into_owned();
			if !matcher.matches(&name) {
				continue;
			}
			let meta = entry.metadata().await?;
			found.push(FileInfo {
				path: format!("{}{}", dir, name).into(),
				size: Some(meta.len()),
				last_modified: meta.modified().ok().map(Timestamp::from_system_time),
			});
		}
		found.sort_by(|a, b| a.path.cmp(&b.path));
		Ok(found)
	}
}

#[async_trait]
impl FileSystem for LocalFileSystem {
	fn name(&self) -> String {
		"LocalFileSystem".into()
	}

	async fn open_file(
		&self,
		path: &str,
		flags: OpenFlags,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<Box<dyn FileHandle>> {
		bounded("open_file", path, opener, async {
			let file = OpenOptions::new()
				.read(flags.read)
				.write(flags.write && !flags.append)
				.append(flags.append)
				.create(flags.create)
				.truncate(flags.truncate)
				.open(local_path(path))
				.await?;
			let handle: Box<dyn FileHandle> =
				Box::new(LocalFileHandle { path: path.to_string(), file });
			Ok(handle)
		})
		.await
	}

	async fn list_files(
		&self,
		directory: &str,
		callback: &mut (dyn for<'e> FnMut(&'e DirEntry) + Send),
		opener: Option<FileOpener<'_>>,
	) -> ClResult<bool> {
		bounded("list_files", directory, opener, async {
			let mut read_dir = match fs::read_dir(local_path(directory)).await {
				Ok(read_dir) => read_dir,
				Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
				Err(err) => return Err(err.into()),
			};
			while let Some(entry) = read_dir.next_entry().await? {
				let is_dir = entry.file_type().await?.is_dir();
				let name = entry.file_name().to_string_lossy().into_owned();
				callback(&DirEntry { name: name.into(), is_dir });
			}
			Ok(true)
		})
		.await
	}

	async fn glob(&self, pattern: &str, opener: Option<FileOpener<'_>>) -> ClResult<Vec<FileInfo>> {
		bounded("glob", pattern, opener, Self::glob_impl(pattern)).await
	}

	async fn remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<()> {
		bounded("remove_file", path, opener, async {
			fs::remove_file(local_path(path)).await?;
			Ok(())
		})
		.await
	}

	async fn try_remove_file(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		bounded("try_remove_file", path, opener, async {
			match fs::remove_file(local_path(path)).await {
				Ok(()) => Ok(true),
				Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
				Err(err) => Err(err.into()),
			}
		})
		.await
	}

	async fn remove_directory(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		bounded("remove_directory", directory, opener, async {
			fs::remove_dir_all(local_path(directory)).await?;
			Ok(())
		})
		.await
	}

	async fn file_exists(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		bounded("file_exists", path, opener, async {
			Ok(Self::stat(path).await?.is_some_and(|meta| meta.is_file()))
		})
		.await
	}

	async fn directory_exists(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<bool> {
		bounded("directory_exists", directory, opener, async {
			Ok(Self::stat(directory).await?.is_some_and(|meta| meta.is_dir()))
		})
		.await
	}

	async fn is_pipe(&self, path: &str, opener: Option<FileOpener<'_>>) -> ClResult<bool> {
		bounded("is_pipe", path, opener, async {
			Ok(Self::stat(path)
				.await?
				.is_some_and(|meta| file_type_of(meta.file_type()) == FileType::Fifo))
		})
		.await
	}

	async fn create_directory(
		&self,
		directory: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		bounded("create_directory", directory, opener, async {
			fs::create_dir(local_path(directory)).await?;
			Ok(())
		})
		.await
	}

	async fn create_directories_recursive(
		&self,
		path: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		bounded("create_directories_recursive", path, opener, async {
			fs::create_dir_all(local_path(path)).await?;
			Ok(())
		})
		.await
	}

	async fn move_file(
		&self,
		source: &str,
		target: &str,
		opener: Option<FileOpener<'_>>,
	) -> ClResult<()> {
		bounded("move_file", source, opener, async {
			fs::rename(local_path(source), local_path(target)).await?;
			Ok(())
		})
		.await
	}

	fn can_handle_file(&self, path: &str) -> bool {
		path.starts_with(FILE_SCHEME) || !path.contains("://")
	}

	fn expand_path(&self, path: &str) -> String {
		match (path.strip_prefix('~'), self.home_directory()) {
			(Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
				format!("{}{}", home, rest)
			}
			_ => path.to_string(),
		}
	}

	fn home_directory(&self) -> Option<String> {
		std::env::var("HOME").ok().filter(|home| !home.is_empty())
	}

	fn can_seek(&self) -> bool {
		true
	}

	fn on_disk_file(&self, handle: &dyn FileHandle) -> bool {
		self.can_handle_file(handle.path()) && Path::new(local_path(handle.path())).is_absolute()
	}
}


// vim: ts=4
