//! Plain data types passed across the file system adapter boundary

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
	}

	pub fn from_system_time(time: SystemTime) -> Timestamp {
		let res = time.duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_i64(self.0)
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		Ok(Timestamp(i64::deserialize(deserializer)?))
	}
}

// FileType //
//**********//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
	Regular,
	Directory,
	Fifo,
	Socket,
	Symlink,
	CharDevice,
	BlockDevice,
	Invalid,
}

// OpenFlags //
//***********//
/// How a handle is opened
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpenFlags {
	pub read: bool,
	pub write: bool,
	/// Create the file if it does not exist
	pub create: bool,
	/// Discard existing content on open
	pub truncate: bool,
	pub append: bool,
}

impl OpenFlags {
	pub const READ: OpenFlags =
		OpenFlags { read: true, write: false, create: false, truncate: false, append: false };
	pub const WRITE: OpenFlags =
		OpenFlags { read: false, write: true, create: false, truncate: false, append: false };

	pub fn create(mut self) -> Self {
		self.create = true;
		self
	}

	pub fn truncate(mut self) -> Self {
		self.truncate = true;
		self
	}

	pub fn append(mut self) -> Self {
		self.append = true;
		self
	}

	pub fn is_write(&self) -> bool {
		self.write || self.append
	}
}

// DirEntry //
//**********//
/// One entry produced by directory listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
	pub name: Box<str>,
	pub is_dir: bool,
}

/// A path plus whatever metadata the backend learned while finding it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
	pub path: Box<str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub size: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub last_modified: Option<Timestamp>,
}

impl FileInfo {
	pub fn new(path: impl Into<Box<str>>) -> Self {
		Self { path: path.into(), size: None, last_modified: None }
	}
}

// Host handles //
//**************//
/// Per-connection context exposed by session-bound setting sources
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
	pub session_id: u64,
	pub user: Option<Box<str>>,
}

/// Shared HTTP client configuration handed to remote backends
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpUtil {
	pub user_agent: Box<str>,
	pub proxy: Option<Box<str>>,
}

impl Default for HttpUtil {
	fn default() -> Self {
		Self { user_agent: concat!("scopefs/", env!("CARGO_PKG_VERSION")).into(), proxy: None }
	}
}


// vim: ts=4
