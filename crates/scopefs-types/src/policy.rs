//! Timeout and retry values as a backend sees them

use std::time::Duration;

use crate::opener::FileOpener;
use crate::prelude::*;
use crate::setting_source::{
	HTTP_RETRIES, HTTP_RETRY_BACKOFF, HTTP_RETRY_WAIT_MS, HTTP_TIMEOUT, SettingSource,
	SettingSourceExt,
};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRIES: u64 = 3;
pub const DEFAULT_RETRY_WAIT_MS: u64 = 100;
pub const DEFAULT_RETRY_BACKOFF: f64 = 4.0;

/// Effective timeout and retry count of one operation. Computed on every
/// lookup, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPolicy {
	/// Whole seconds; zero means no limit
	pub timeout: Duration,
	pub retries: u64,
}

impl Default for ResolvedPolicy {
	fn default() -> Self {
		Self { timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS), retries: DEFAULT_RETRIES }
	}
}

impl ResolvedPolicy {
	/// Read the generic timeout and retry keys; host defaults fill in missing keys
	pub fn from_source(source: &dyn SettingSource) -> ClResult<Self> {
		let timeout = source.get_u64(HTTP_TIMEOUT)?.unwrap_or(DEFAULT_TIMEOUT_SECONDS);
		let retries = source.get_u64(HTTP_RETRIES)?.unwrap_or(DEFAULT_RETRIES);
		Ok(Self { timeout: Duration::from_secs(timeout), retries })
	}

	pub fn from_opener(opener: Option<FileOpener<'_>>) -> ClResult<Self> {
		match opener {
			Some(opener) => Self::from_source(opener.source()),
			None => Ok(Self::default()),
		}
	}
}

/// Everything a remote backend needs to drive its request loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestParams {
	pub policy: ResolvedPolicy,
	pub retry_wait: Duration,
	pub retry_backoff: f64,
}

impl Default for RequestParams {
	fn default() -> Self {
		Self {
			policy: ResolvedPolicy::default(),
			retry_wait: Duration::from_millis(DEFAULT_RETRY_WAIT_MS),
			retry_backoff: DEFAULT_RETRY_BACKOFF,
		}
	}
}

impl RequestParams {
	pub fn from_source(source: &dyn SettingSource) -> ClResult<Self> {
		let policy = ResolvedPolicy::from_source(source)?;
		let retry_wait = source.get_u64(HTTP_RETRY_WAIT_MS)?.unwrap_or(DEFAULT_RETRY_WAIT_MS);
		let retry_backoff = source.get_f64(HTTP_RETRY_BACKOFF)?.unwrap_or(DEFAULT_RETRY_BACKOFF);
		Ok(Self { policy, retry_wait: Duration::from_millis(retry_wait), retry_backoff })
	}

	pub fn from_opener(opener: Option<FileOpener<'_>>) -> ClResult<Self> {
		match opener {
			Some(opener) => Self::from_source(opener.source()),
			None => Ok(Self::default()),
		}
	}

}


// vim: ts=4
