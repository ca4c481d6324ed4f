//! Operation categories and their per-category setting keys

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of file system operation a timeout/retry setting applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationCategory {
	Open,
	Read,
	Write,
	List,
	Delete,
	Stat,
	CreateDir,
}

/// Timeout (milliseconds) and retry-count keys of one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingKey {
	pub timeout_key: &'static str,
	pub retries_key: &'static str,
}

impl OperationCategory {
	pub const ALL: [OperationCategory; 7] = [
		OperationCategory::Open,
		OperationCategory::Read,
		OperationCategory::Write,
		OperationCategory::List,
		OperationCategory::Delete,
		OperationCategory::Stat,
		OperationCategory::CreateDir,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			OperationCategory::Open => "open",
			OperationCategory::Read => "read",
			OperationCategory::Write => "write",
			OperationCategory::List => "list",
			OperationCategory::Delete => "delete",
			OperationCategory::Stat => "stat",
			OperationCategory::CreateDir => "create_dir",
		}
	}

	pub fn setting_key(self) -> SettingKey {
		match self {
			OperationCategory::Open => {
				SettingKey { timeout_key: "httpfs_timeout_open_ms", retries_key: "httpfs_retries_open" }
			}
			OperationCategory::Read => {
				SettingKey { timeout_key: "httpfs_timeout_read_ms", retries_key: "httpfs_retries_read" }
			}
			OperationCategory::Write => SettingKey {
				timeout_key: "httpfs_timeout_write_ms",
				retries_key: "httpfs_retries_write",
			},
			OperationCategory::List => {
				SettingKey { timeout_key: "httpfs_timeout_list_ms", retries_key: "httpfs_retries_list" }
			}
			OperationCategory::Delete => SettingKey {
				timeout_key: "httpfs_timeout_delete_ms",
				retries_key: "httpfs_retries_delete",
			},
			OperationCategory::Stat => {
				SettingKey { timeout_key: "httpfs_timeout_stat_ms", retries_key: "httpfs_retries_stat" }
			}
			OperationCategory::CreateDir => SettingKey {
				timeout_key: "httpfs_timeout_create_dir_ms",
				retries_key: "httpfs_retries_create_dir",
			},
		}
	}

	pub fn timeout_key(self) -> &'static str {
		self.setting_key().timeout_key
	}

	pub fn retries_key(self) -> &'static str {
		self.setting_key().retries_key
	}
}

impl fmt::Display for OperationCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}


// vim: ts=4
