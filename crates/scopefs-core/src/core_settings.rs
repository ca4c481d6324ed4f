//! Timeout and retry settings registration
//!
//! The generic `http_*` keys belong to the host storage layer; the
//! per-category `httpfs_*` keys are added on top of them.

use crate::prelude::*;
use scopefs_types::category::OperationCategory;
use scopefs_types::policy::{
	DEFAULT_RETRIES, DEFAULT_RETRY_BACKOFF, DEFAULT_RETRY_WAIT_MS, DEFAULT_TIMEOUT_SECONDS,
};
use scopefs_types::setting_source::{
	HTTP_RETRIES, HTTP_RETRY_BACKOFF, HTTP_RETRY_WAIT_MS, HTTP_TIMEOUT,
};
use scopefs_types::settings::{
	FrozenSettingsRegistry, SettingDefinition, SettingScope, SettingValue, SettingsRegistry,
	validate_unsigned,
};

pub const RETRY_ON_TIMEOUT: &str = "httpfs_retry_on_timeout";
pub const RETRY_ON_CONNECTION_ERROR: &str = "httpfs_retry_on_connection_error";

/// Defaults of the per-category keys. `None` registers the key with a null
/// default, so the generic key applies until a value is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryDefaults {
	pub timeout_ms: Option<u64>,
	pub retries: Option<u64>,
}

impl Default for CategoryDefaults {
	fn default() -> Self {
		Self { timeout_ms: Some(DEFAULT_TIMEOUT_SECONDS * 1000), retries: Some(DEFAULT_RETRIES) }
	}
}

impl CategoryDefaults {
	pub fn unset() -> Self {
		Self { timeout_ms: None, retries: None }
	}
}

fn describe(category: OperationCategory) -> &'static str {
	match category {
		OperationCategory::Open => "opening files",
		OperationCategory::Read => "reading files",
		OperationCategory::Write => "writing and moving files",
		OperationCategory::List => "listing directories",
		OperationCategory::Delete => "deleting files and directories",
		OperationCategory::Stat => "querying file metadata",
		OperationCategory::CreateDir => "creating directories",
	}
}

fn unsigned_setting(
	key: &str,
	description: String,
	default: Option<u64>,
) -> ClResult<SettingDefinition> {
	SettingDefinition::builder(key)
		.description(description)
		.default(default.map_or(SettingValue::Null, SettingValue::from))
		.optional(default.is_none())
		.scope(SettingScope::Session)
		.validator(validate_unsigned)
		.build()
}

/// Register the generic request settings of the host storage layer
pub fn register_http_settings(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(unsigned_setting(
		HTTP_TIMEOUT,
		"HTTP timeout read/write/connection/retry (in seconds)".into(),
		Some(DEFAULT_TIMEOUT_SECONDS),
	)?)?;

	registry.register(unsigned_setting(
		HTTP_RETRIES,
		"HTTP retries on I/O error".into(),
		Some(DEFAULT_RETRIES),
	)?)?;

	registry.register(unsigned_setting(
		HTTP_RETRY_WAIT_MS,
		"Time between retries (in milliseconds)".into(),
		Some(DEFAULT_RETRY_WAIT_MS),
	)?)?;

	registry.register(
		SettingDefinition::builder(HTTP_RETRY_BACKOFF)
			.description("Backoff factor for exponentially increasing retry wait time")
			.default(DEFAULT_RETRY_BACKOFF)
			.scope(SettingScope::Session)
			.validator(|value| match value.as_f64() {
				Some(f) if f >= 1.0 => Ok(()),
				_ => Err(Error::ValidationError("retry backoff must be a number >= 1.0".into())),
			})
			.build()?,
	)?;

	Ok(())
}

/// Register the per-category timeout and retry settings
pub fn register_settings(
	registry: &mut SettingsRegistry,
	defaults: &CategoryDefaults,
) -> ClResult<()> {
	for category in OperationCategory::ALL {
		let key = category.setting_key();
		registry.register(unsigned_setting(
			key.timeout_key,
			format!("Timeout for {} (in milliseconds)", describe(category)),
			defaults.timeout_ms,
		)?)?;
		registry.register(unsigned_setting(
			key.retries_key,
			format!("Maximum number of retries for {}", describe(category)),
			defaults.retries,
		)?)?;
	}

	registry.register(
		SettingDefinition::builder(RETRY_ON_TIMEOUT)
			.description("Whether to retry on timeout errors")
			.default(true)
			.scope(SettingScope::Global)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(RETRY_ON_CONNECTION_ERROR)
			.description("Whether to retry on connection errors")
			.default(true)
			.scope(SettingScope::Global)
			.build()?,
	)?;

	Ok(())
}

/// Whether `register_settings` has run for this registry
pub fn category_settings_registered(registry: &FrozenSettingsRegistry) -> bool {
	OperationCategory::ALL.iter().all(|category| {
		let key = category.setting_key();
		registry.get(key.timeout_key).is_some() && registry.get(key.retries_key).is_some()
	})
}


// vim: ts=4
