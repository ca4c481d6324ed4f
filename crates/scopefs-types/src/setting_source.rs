//! Capability for reading settings on behalf of a file system operation

use std::fmt::Debug;
use std::sync::Arc;

use crate::opener::SettingResolver;
use crate::prelude::*;
use crate::settings::{SettingScope, SettingValue};
use crate::types::{HttpUtil, SessionContext};

/// Generic request timeout, in seconds
pub const HTTP_TIMEOUT: &str = "http_timeout";
/// Generic request retry count
pub const HTTP_RETRIES: &str = "http_retries";
/// Initial wait between retries, in milliseconds
pub const HTTP_RETRY_WAIT_MS: &str = "http_retry_wait_ms";
/// Multiplier applied to the wait after every retry
pub const HTTP_RETRY_BACKOFF: &str = "http_retry_backoff";

/// A value found by a setting lookup, with the scope it was found at
#[derive(Debug, Clone, PartialEq)]
pub struct SettingLookup {
	pub value: SettingValue,
	pub scope: SettingScope,
}

impl SettingLookup {
	pub fn global(value: impl Into<SettingValue>) -> Self {
		Self { value: value.into(), scope: SettingScope::Global }
	}

	pub fn session(value: impl Into<SettingValue>) -> Self {
		Self { value: value.into(), scope: SettingScope::Session }
	}
}

/// Source of settings handed to file system operations.
///
/// Lookups must observe the current value of the underlying store on every
/// call. Implementations never cache.
pub trait SettingSource: Debug + Send + Sync {
	/// Look up `key`. `Ok(None)` means the key is unknown to this source.
	fn try_get_setting(&self, key: &str) -> ClResult<Option<SettingLookup>>;

	fn session(&self) -> Option<&SessionContext> {
		None
	}

	fn http_util(&self) -> Option<Arc<HttpUtil>> {
		None
	}

	/// Span backends should log under
	fn span(&self) -> tracing::Span {
		tracing::Span::current()
	}

	/// `Some` when this source is already scoped to an operation category
	fn as_resolver(&self) -> Option<&SettingResolver<'_>> {
		None
	}
}

/// Convenience accessors shared by every source
pub trait SettingSourceExt: SettingSource {
	/// Read an unsigned integer setting; `None` if missing or null
	fn get_u64(&self, key: &str) -> ClResult<Option<u64>> {
		match self.try_get_setting(key)? {
			None => Ok(None),
			Some(SettingLookup { value: SettingValue::Null, .. }) => Ok(None),
			Some(SettingLookup { value, .. }) => value.as_u64().map(Some).ok_or_else(|| {
				Error::ValidationError(format!(
					"Setting '{}' is not a non-negative integer, got {}",
					key,
					value.type_name()
				))
			}),
		}
	}

	/// Read a float setting (integers are widened); `None` if missing or null
	fn get_f64(&self, key: &str) -> ClResult<Option<f64>> {
		match self.try_get_setting(key)? {
			None => Ok(None),
			Some(SettingLookup { value: SettingValue::Null, .. }) => Ok(None),
			Some(SettingLookup { value, .. }) => value.as_f64().map(Some).ok_or_else(|| {
				Error::ValidationError(format!(
					"Setting '{}' is not a number, got {}",
					key,
					value.type_name()
				))
			}),
		}
	}
}

impl<T: SettingSource + ?Sized> SettingSourceExt for T {}


// vim: ts=4
