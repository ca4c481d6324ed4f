//! Database-wide configuration store
//!
//! Holds the frozen setting definitions and the values set at runtime. Reads
//! always observe the latest write; nothing is cached.

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::prelude::*;
use scopefs_types::settings::{FrozenSettingsRegistry, SettingDefinition, SettingValue};

pub struct ConfigStore {
	registry: FrozenSettingsRegistry,
	values: RwLock<HashMap<String, SettingValue>>,
}

impl std::fmt::Debug for ConfigStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ConfigStore")
			.field("definitions", &self.registry.len())
			.field("values", &self.values.read().len())
			.finish()
	}
}

impl ConfigStore {
	pub fn new(registry: FrozenSettingsRegistry) -> Self {
		Self { registry, values: RwLock::new(HashMap::new()) }
	}

	pub fn registry(&self) -> &FrozenSettingsRegistry {
		&self.registry
	}

	pub fn is_registered(&self, key: &str) -> bool {
		self.registry.get(key).is_some()
	}

	/// Current value of `key`: the value set at runtime, else the registered
	/// default. `None` if the key is not registered.
	pub fn get(&self, key: &str) -> Option<SettingValue> {
		let def = self.registry.get(key)?;
		if let Some(value) = self.values.read().get(key) {
			return Some(value.clone());
		}
		Some(def.default.clone())
	}

	/// Validate `value` against the definition of `key`
	pub fn check(&self, key: &str, value: &SettingValue) -> ClResult<&SettingDefinition> {
		let def = self
			.registry
			.get(key)
			.ok_or_else(|| Error::ConfigError(format!("Unknown setting: {}", key)))?;

		if !value.matches_type(&def.default) {
			return Err(Error::ConfigError(format!(
				"Type mismatch for setting '{}': expected {}, got {}",
				key,
				def.default.type_name(),
				value.type_name()
			)));
		}

		if let Some(validator) = &def.validator {
			if !value.is_null() {
				validator(value)?;
			}
		}

		Ok(def)
	}

	/// Set the database-wide value of `key`. Setting `Null` explicitly marks
	/// the key as unset (readers fall back as if it had no value).
	pub fn set(&self, key: &str, value: impl Into<SettingValue>) -> ClResult<()> {
		let value = value.into();
		self.check(key, &value)?;
		info!("Setting '{}' updated to {:?}", key, value);
		self.values.write().insert(key.to_string(), value);
		Ok(())
	}

	/// Restore the registered default; returns whether a value was set
	pub fn reset(&self, key: &str) -> ClResult<bool> {
		if !self.is_registered(key) {
			return Err(Error::ConfigError(format!("Unknown setting: {}", key)));
		}
		let removed = self.values.write().remove(key).is_some();
		if removed {
			info!("Setting '{}' reset to default", key);
		}
		Ok(removed)
	}

	/// Apply a JSON object of `key: value` pairs, as read from a config file
	pub fn apply_json(&self, json: &serde_json::Value) -> ClResult<()> {
		let obj = json
			.as_object()
			.ok_or_else(|| Error::ConfigError("Settings must be a JSON object".into()))?;
		for (key, value) in obj {
			let value = serde_json::from_value::<SettingValue>(value.clone()).map_err(|e| {
				Error::ConfigError(format!("Invalid value for setting '{}': {}", key, e))
			})?;
			self.set(key, value)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use scopefs_types::settings::{SettingDefinition, SettingsRegistry, validate_unsigned};

	fn store() -> ConfigStore {
		let mut registry = SettingsRegistry::new();
		let defs = [
			SettingDefinition::builder("t_ms")
				.description("t")
				.default(30_000u64)
				.validator(validate_unsigned)
				.build(),
			SettingDefinition::builder("opt").description("o").optional(true).build(),
			SettingDefinition::builder("backoff").description("b").default(4.0).build(),
		];
		for def in defs {
			assert!(def.and_then(|def| registry.register(def)).is_ok());
		}
		ConfigStore::new(registry.freeze())
	}

	#[test]
	fn test_get_default_and_set() {
		let store = store();
		assert_eq!(store.get("t_ms"), Some(SettingValue::Int(30_000)));
		assert_eq!(store.get("unknown"), None);

		assert!(store.set("t_ms", 10_000u64).is_ok());
		assert_eq!(store.get("t_ms"), Some(SettingValue::Int(10_000)));

		assert_eq!(store.reset("t_ms").ok(), Some(true));
		assert_eq!(store.get("t_ms"), Some(SettingValue::Int(30_000)));
		assert_eq!(store.reset("t_ms").ok(), Some(false));
	}

	#[test]
	fn test_set_validates() {
		let store = store();
		assert!(matches!(store.set("unknown", 1u64), Err(Error::ConfigError(_))));
		assert!(matches!(store.set("t_ms", true), Err(Error::ConfigError(_))));
		assert!(matches!(store.set("t_ms", SettingValue::Int(-5)), Err(Error::ValidationError(_))));
		// Integers are accepted for float settings
		assert!(store.set("backoff", SettingValue::Int(2)).is_ok());
	}

	#[test]
	fn test_null_marks_unset() {
		let store = store();
		assert_eq!(store.get("opt"), Some(SettingValue::Null));
		assert!(store.set("opt", 5u64).is_ok());
		assert!(store.set("t_ms", SettingValue::Null).is_ok());
		assert_eq!(store.get("t_ms"), Some(SettingValue::Null));
	}

	#[test]
	fn test_apply_json() {
		let store = store();
		let json = serde_json::json!({ "t_ms": 1500, "backoff": 2.5 });
		assert!(store.apply_json(&json).is_ok());
		assert_eq!(store.get("t_ms"), Some(SettingValue::Int(1500)));
		assert_eq!(store.get("backoff"), Some(SettingValue::Float(2.5)));

		assert!(store.apply_json(&serde_json::json!([1])).is_err());
		assert!(store.apply_json(&serde_json::json!({ "nope": 1 })).is_err());
	}
}

// vim: ts=4
