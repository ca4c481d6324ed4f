//! Operation-scoped setting resolution
//!
//! A [`SettingResolver`] sits between a file system backend and the setting
//! source it was handed. Backends only ever ask for the generic
//! [`HTTP_TIMEOUT`] and [`HTTP_RETRIES`] keys; the resolver answers them with
//! the value configured for its [`OperationCategory`], falling back to the
//! generic value when the category key is missing or null.
//!
//! Per-category timeouts are stored in milliseconds while the generic timeout
//! is in seconds, so a category value is converted on the way out:
//!
//! | category ms | resolved seconds |
//! |-------------|------------------|
//! | 0           | 0                |
//! | 1..=999     | 1                |
//! | n >= 1000   | n / 1000         |
//!
//! Fallback values are returned exactly as the underlying source reports
//! them; they are already in seconds.
//!
//! Whether a source is already scoped is answered by the source itself
//! ([`SettingSource::as_resolver`]), so a resolver is never wrapped in a
//! second one, whichever [`FileOpener`] variant it arrives in.

use std::sync::Arc;

use crate::category::OperationCategory;
use crate::prelude::*;
use crate::setting_source::{HTTP_RETRIES, HTTP_TIMEOUT, SettingLookup, SettingSource};
use crate::settings::SettingValue;
use crate::types::{HttpUtil, SessionContext};

/// Convert a millisecond timeout to whole seconds, rounding sub-second
/// non-zero values up to one second
pub fn ms_to_seconds(ms: u64) -> u64 {
	if ms > 0 && ms < 1000 { 1 } else { ms / 1000 }
}

/// Setting source scoped to one operation category
#[derive(Debug, Clone, Copy)]
pub struct SettingResolver<'a> {
	inner: &'a dyn SettingSource,
	category: OperationCategory,
}

impl<'a> SettingResolver<'a> {
	pub fn new(inner: &'a dyn SettingSource, category: OperationCategory) -> Self {
		Self { inner, category }
	}

	pub fn category(&self) -> OperationCategory {
		self.category
	}

	/// The source this resolver reads through
	pub fn inner(&self) -> &'a dyn SettingSource {
		self.inner
	}

	/// Category value of `key`, or `None` when it is missing or null
	fn category_value(&self, key: &str) -> ClResult<Option<u64>> {
		match self.inner.try_get_setting(key)? {
			None | Some(SettingLookup { value: SettingValue::Null, .. }) => Ok(None),
			Some(SettingLookup { value, .. }) => value.as_u64().map(Some).ok_or_else(|| {
				Error::ValidationError(format!(
					"Setting '{}' is not a non-negative integer, got {}",
					key,
					value.type_name()
				))
			}),
		}
	}

	fn resolve_timeout(&self) -> ClResult<Option<SettingLookup>> {
		let key = self.category.timeout_key();
		match self.category_value(key)? {
			Some(ms) => {
				let seconds = ms_to_seconds(ms);
				debug!(category = %self.category, key, ms, seconds, "resolved category timeout");
				Ok(Some(SettingLookup::global(seconds)))
			}
			None => {
				debug!(category = %self.category, key, "category timeout unset, using {}", HTTP_TIMEOUT);
				self.inner.try_get_setting(HTTP_TIMEOUT)
			}
		}
	}

	fn resolve_retries(&self) -> ClResult<Option<SettingLookup>> {
		let key = self.category.retries_key();
		match self.category_value(key)? {
			Some(retries) => {
				debug!(category = %self.category, key, retries, "resolved category retries");
				Ok(Some(SettingLookup::global(retries)))
			}
			None => {
				debug!(category = %self.category, key, "category retries unset, using {}", HTTP_RETRIES);
				self.inner.try_get_setting(HTTP_RETRIES)
			}
		}
	}
}

impl SettingSource for SettingResolver<'_> {
	fn try_get_setting(&self, key: &str) -> ClResult<Option<SettingLookup>> {
		match key {
			HTTP_TIMEOUT => self.resolve_timeout(),
			HTTP_RETRIES => self.resolve_retries(),
			_ => self.inner.try_get_setting(key),
		}
	}

	fn session(&self) -> Option<&SessionContext> {
		self.inner.session()
	}

	fn http_util(&self) -> Option<Arc<HttpUtil>> {
		self.inner.http_util()
	}

	fn span(&self) -> tracing::Span {
		self.inner.span()
	}

	fn as_resolver(&self) -> Option<&SettingResolver<'_>> {
		Some(self)
	}
}

/// Setting source handed to a file system operation
#[derive(Debug, Clone, Copy)]
pub enum FileOpener<'a> {
	/// Not yet scoped to any category
	Plain(&'a dyn SettingSource),
	/// Already scoped by an outer layer; must not be re-scoped
	Scoped(&'a SettingResolver<'a>),
}

impl<'a> FileOpener<'a> {
	pub fn source(&self) -> &'a dyn SettingSource {
		match *self {
			FileOpener::Plain(source) => source,
			FileOpener::Scoped(resolver) => resolver,
		}
	}

	/// The resolver behind this opener, if it is scoped under either tag
	pub fn resolver(&self) -> Option<&'a SettingResolver<'a>> {
		match *self {
			FileOpener::Plain(source) => source.as_resolver(),
			FileOpener::Scoped(resolver) => Some(resolver),
		}
	}

	pub fn category(&self) -> Option<OperationCategory> {
		self.resolver().map(SettingResolver::category)
	}

	pub fn is_scoped(&self) -> bool {
		self.resolver().is_some()
	}

	pub fn try_get_setting(&self, key: &str) -> ClResult<Option<SettingLookup>> {
		self.source().try_get_setting(key)
	}
}

impl<'a> From<&'a SettingResolver<'a>> for FileOpener<'a> {
	fn from(resolver: &'a SettingResolver<'a>) -> Self {
		FileOpener::Scoped(resolver)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::setting_source::{HTTP_RETRY_BACKOFF, HTTP_RETRY_WAIT_MS, SettingSourceExt};
	use crate::settings::SettingScope;
	use std::collections::HashMap;

	#[derive(Debug, Default)]
	struct MapSource {
		values: HashMap<String, SettingValue>,
	}

	impl MapSource {
		fn with(mut self, key: &str, value: impl Into<SettingValue>) -> Self {
			self.values.insert(key.to_string(), value.into());
			self
		}
	}

	impl SettingSource for MapSource {
		fn try_get_setting(&self, key: &str) -> ClResult<Option<SettingLookup>> {
			Ok(self.values.get(key).cloned().map(SettingLookup::session))
		}
	}

	fn timeout(source: &dyn SettingSource) -> Option<u64> {
		source.get_u64(HTTP_TIMEOUT).ok().flatten()
	}

	fn retries(source: &dyn SettingSource) -> Option<u64> {
		source.get_u64(HTTP_RETRIES).ok().flatten()
	}

	#[test]
	fn test_ms_to_seconds_boundaries() {
		assert_eq!(ms_to_seconds(0), 0);
		assert_eq!(ms_to_seconds(1), 1);
		assert_eq!(ms_to_seconds(999), 1);
		assert_eq!(ms_to_seconds(1000), 1);
		assert_eq!(ms_to_seconds(1999), 1);
		assert_eq!(ms_to_seconds(2000), 2);
		assert_eq!(ms_to_seconds(45_500), 45);
	}

	#[test]
	fn test_category_timeout_is_converted() {
		for category in OperationCategory::ALL {
			for (ms, expected) in [(0u64, 0u64), (500, 1), (999, 1), (1000, 1), (1999, 1), (2000, 2)] {
				let source = MapSource::default().with(category.timeout_key(), ms);
				let resolver = SettingResolver::new(&source, category);
				assert_eq!(timeout(&resolver), Some(expected), "{} {}ms", category, ms);
			}
		}
	}

	#[test]
	fn test_converted_value_is_global_scope() {
		let source = MapSource::default().with("httpfs_timeout_stat_ms", 5000u64);
		let resolver = SettingResolver::new(&source, OperationCategory::Stat);
		let lookup = resolver.try_get_setting(HTTP_TIMEOUT).ok().flatten();
		assert_eq!(lookup, Some(SettingLookup::global(5u64)));
	}

	#[test]
	fn test_fallback_is_not_converted() {
		for category in OperationCategory::ALL {
			let source = MapSource::default().with(HTTP_TIMEOUT, 45u64).with(HTTP_RETRIES, 7u64);
			let resolver = SettingResolver::new(&source, category);
			assert_eq!(timeout(&resolver), Some(45));
			assert_eq!(retries(&resolver), Some(7));
		}
	}

	#[test]
	fn test_null_category_value_falls_back() {
		let source = MapSource::default()
			.with("httpfs_timeout_list_ms", SettingValue::Null)
			.with("httpfs_retries_list", SettingValue::Null)
			.with(HTTP_TIMEOUT, 12u64)
			.with(HTTP_RETRIES, 1u64);
		let resolver = SettingResolver::new(&source, OperationCategory::List);
		let lookup = resolver.try_get_setting(HTTP_TIMEOUT).ok().flatten();
		// Fallback keeps the underlying scope
		assert_eq!(lookup.map(|l| l.scope), Some(SettingScope::Session));
		assert_eq!(timeout(&resolver), Some(12));
		assert_eq!(retries(&resolver), Some(1));
	}

	#[test]
	fn test_nothing_configured() {
		let source = MapSource::default();
		let resolver = SettingResolver::new(&source, OperationCategory::Open);
		assert_eq!(resolver.try_get_setting(HTTP_TIMEOUT).ok().flatten(), None);
		assert_eq!(resolver.try_get_setting(HTTP_RETRIES).ok().flatten(), None);
	}

	#[test]
	fn test_retries_are_verbatim() {
		for category in OperationCategory::ALL {
			let source = MapSource::default().with(category.retries_key(), 1500u64);
			let resolver = SettingResolver::new(&source, category);
			assert_eq!(retries(&resolver), Some(1500));
		}
	}

	#[test]
	fn test_other_keys_pass_through() {
		for category in OperationCategory::ALL {
			let source = MapSource::default()
				.with(HTTP_RETRY_WAIT_MS, 200u64)
				.with(HTTP_RETRY_BACKOFF, 2.0);
			let resolver = SettingResolver::new(&source, category);
			assert_eq!(resolver.get_u64(HTTP_RETRY_WAIT_MS).ok().flatten(), Some(200));
			assert_eq!(resolver.get_f64(HTTP_RETRY_BACKOFF).ok().flatten(), Some(2.0));
			// Category keys themselves are not intercepted either
			assert_eq!(resolver.get_u64(category.timeout_key()).ok().flatten(), None);
		}
	}

	#[test]
	fn test_only_own_category_is_used() {
		let source = MapSource::default()
			.with("httpfs_timeout_open_ms", 10_000u64)
			.with("httpfs_retries_open", 2u64)
			.with("httpfs_timeout_read_ms", 20_000u64)
			.with("httpfs_retries_read", 4u64);

		let open = SettingResolver::new(&source, OperationCategory::Open);
		assert_eq!((timeout(&open), retries(&open)), (Some(10), Some(2)));

		let read = SettingResolver::new(&source, OperationCategory::Read);
		assert_eq!((timeout(&read), retries(&read)), (Some(20), Some(4)));

		let write = SettingResolver::new(&source, OperationCategory::Write);
		assert_eq!((timeout(&write), retries(&write)), (None, None));
	}

	#[test]
	fn test_invalid_category_value_is_an_error() {
		let source = MapSource::default().with("httpfs_timeout_delete_ms", SettingValue::Int(-1));
		let resolver = SettingResolver::new(&source, OperationCategory::Delete);
		assert!(matches!(resolver.try_get_setting(HTTP_TIMEOUT), Err(Error::ValidationError(_))));
	}

	#[test]
	fn test_file_opener_tags() {
		let source = MapSource::default();
		let plain = FileOpener::Plain(&source);
		assert!(!plain.is_scoped());
		assert_eq!(plain.category(), None);

		let resolver = SettingResolver::new(&source, OperationCategory::List);
		let scoped = FileOpener::from(&resolver);
		assert!(scoped.is_scoped());
		assert_eq!(scoped.category(), Some(OperationCategory::List));
	}

	#[test]
	fn test_resolver_under_plain_tag_is_scoped() {
		let source = MapSource::default();
		assert!(source.as_resolver().is_none());

		let resolver = SettingResolver::new(&source, OperationCategory::Delete);
		let opener = FileOpener::Plain(&resolver);
		assert!(opener.is_scoped());
		assert_eq!(opener.category(), Some(OperationCategory::Delete));
		assert_eq!(opener.resolver().map(SettingResolver::category), Some(OperationCategory::Delete));
	}
}

// vim: ts=4
