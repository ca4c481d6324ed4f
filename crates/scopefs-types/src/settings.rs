//! Setting value types, definitions, and the definition registry
//!
//! Settings are registered once at database build time and frozen. Runtime
//! values live in the host's configuration store; this module only describes
//! what a key is allowed to hold.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::prelude::*;

/// Type alias for setting validator function
pub type SettingValidator = Box<dyn Fn(&SettingValue) -> ClResult<()> + Send + Sync>;

/// Where a setting value was resolved, or may be overridden
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingScope {
	/// Database-wide value shared by every session
	#[serde(rename = "global")]
	Global,
	/// Session-local override of a global value
	#[serde(rename = "session")]
	Session,
}

/// Setting value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)] // No type tag - type inferred from SettingDefinition
pub enum SettingValue {
	Null,
	Bool(bool), // Must be before Int to avoid bool -> int coercion
	Int(i64),
	Float(f64),
	String(String),
	Json(serde_json::Value),
}

impl SettingValue {
	pub fn is_null(&self) -> bool {
		matches!(self, SettingValue::Null)
	}

	/// Non-negative integer view, as used by every timeout and retry key
	pub fn as_u64(&self) -> Option<u64> {
		match self {
			SettingValue::Int(i) => u64::try_from(*i).ok(),
			_ => None,
		}
	}

	#[allow(clippy::cast_precision_loss)]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			SettingValue::Float(f) => Some(*f),
			SettingValue::Int(i) => Some(*i as f64),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			SettingValue::Bool(b) => Some(*b),
			_ => None,
		}
	}

	/// Check if this value may be stored where `other` is the declared type.
	/// Null is accepted everywhere, and integers are accepted for float settings.
	pub fn matches_type(&self, other: &SettingValue) -> bool {
		matches!(
			(self, other),
			(SettingValue::Null, _)
				| (_, SettingValue::Null)
				| (SettingValue::String(_), SettingValue::String(_))
				| (SettingValue::Int(_), SettingValue::Int(_))
				| (SettingValue::Int(_) | SettingValue::Float(_), SettingValue::Float(_))
				| (SettingValue::Bool(_), SettingValue::Bool(_))
				| (SettingValue::Json(_), SettingValue::Json(_))
		)
	}

	/// Get the type name for error messages
	pub fn type_name(&self) -> &'static str {
		match self {
			SettingValue::Null => "null",
			SettingValue::String(_) => "string",
			SettingValue::Int(_) => "int",
			SettingValue::Float(_) => "float",
			SettingValue::Bool(_) => "bool",
			SettingValue::Json(_) => "json",
		}
	}
}

impl From<u64> for SettingValue {
	fn from(value: u64) -> Self {
		SettingValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
	}
}

impl From<f64> for SettingValue {
	fn from(value: f64) -> Self {
		SettingValue::Float(value)
	}
}

impl From<bool> for SettingValue {
	fn from(value: bool) -> Self {
		SettingValue::Bool(value)
	}
}

/// Setting definition - defines metadata for each setting
pub struct SettingDefinition {
	/// Flat key (e.g., "httpfs_timeout_list_ms")
	pub key: String,

	/// Human-readable description
	pub description: String,

	/// Value reported when nothing was set. `Null` means "unset".
	pub default: SettingValue,

	/// Narrowest scope a value may be set at
	pub scope: SettingScope,

	/// Optional validation function
	pub validator: Option<SettingValidator>,
}

impl Clone for SettingDefinition {
	fn clone(&self) -> Self {
		SettingDefinition {
			key: self.key.clone(),
			description: self.description.clone(),
			default: self.default.clone(),
			scope: self.scope,
			validator: None, // Don't clone the validator function
		}
	}
}

impl Debug for SettingDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingDefinition")
			.field("key", &self.key)
			.field("description", &self.description)
			.field("default", &self.default)
			.field("scope", &self.scope)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl SettingDefinition {
	/// Create a builder for constructing a SettingDefinition
	pub fn builder(key: impl Into<String>) -> SettingDefinitionBuilder {
		SettingDefinitionBuilder::new(key)
	}
}

/// Builder for SettingDefinition with fluent API
pub struct SettingDefinitionBuilder {
	key: String,
	description: Option<String>,
	default: Option<SettingValue>,
	scope: SettingScope,
	optional: bool,
	validator: Option<SettingValidator>,
}

impl SettingDefinitionBuilder {
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			description: None,
			default: None,
			scope: SettingScope::Session,
			optional: false,
			validator: None,
		}
	}

	/// Set the description (required)
	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Set the default value
	pub fn default(mut self, value: impl Into<SettingValue>) -> Self {
		self.default = Some(value.into());
		self
	}

	/// Set the setting scope (defaults to Session)
	pub fn scope(mut self, scope: SettingScope) -> Self {
		self.scope = scope;
		self
	}

	/// Allow the setting to have no default (it reads as `Null` until set)
	pub fn optional(mut self, optional: bool) -> Self {
		self.optional = optional;
		self
	}

	/// Set a validation function
	pub fn validator<F>(mut self, f: F) -> Self
	where
		F: Fn(&SettingValue) -> ClResult<()> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(f));
		self
	}

	/// Build the SettingDefinition
	pub fn build(self) -> ClResult<SettingDefinition> {
		let description = self
			.description
			.ok_or_else(|| Error::ConfigError("Setting description is required".into()))?;

		let default = match (self.default, self.optional) {
			(Some(default), _) => default,
			(None, true) => SettingValue::Null,
			(None, false) => {
				return Err(Error::ConfigError(format!(
					"Setting '{}' needs a default or must be optional",
					self.key
				)));
			}
		};

		if default.is_null() && !self.optional {
			return Err(Error::ConfigError(format!(
				"Setting '{}' has a null default but is not optional",
				self.key
			)));
		}

		if let Some(validator) = &self.validator {
			if !default.is_null() {
				validator(&default)?;
			}
		}

		Ok(SettingDefinition {
			key: self.key,
			description,
			default,
			scope: self.scope,
			validator: self.validator,
		})
	}
}

/// Validator accepting only non-negative integers (or null)
pub fn validate_unsigned(value: &SettingValue) -> ClResult<()> {
	match value {
		SettingValue::Null => Ok(()),
		v if v.as_u64().is_some() => Ok(()),
		v => Err(Error::ValidationError(format!(
			"expected a non-negative integer, got {}",
			v.type_name()
		))),
	}
}

/// Mutable registry used while the database is being built
pub struct SettingsRegistry {
	definitions: HashMap<String, SettingDefinition>,
}

impl SettingsRegistry {
	pub fn new() -> Self {
		Self { definitions: HashMap::new() }
	}

	/// Register a new setting definition
	pub fn register(&mut self, def: SettingDefinition) -> ClResult<()> {
		if self.definitions.contains_key(&def.key) {
			return Err(Error::ConfigError(format!("Setting '{}' is already registered", def.key)));
		}

		debug!("Registering setting: {}", def.key);
		self.definitions.insert(def.key.clone(), def);
		Ok(())
	}

	pub fn contains(&self, key: &str) -> bool {
		self.definitions.contains_key(key)
	}

	/// Freeze the registry (make it immutable)
	pub fn freeze(self) -> FrozenSettingsRegistry {
		info!("Freezing settings registry with {} definitions", self.definitions.len());
		FrozenSettingsRegistry { definitions: self.definitions }
	}

	/// Get number of registered settings
	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	/// Check if registry is empty
	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

impl Default for SettingsRegistry {
	fn default() -> Self {
		Self::new()
	}
}

/// Immutable registry owned by the configuration store
pub struct FrozenSettingsRegistry {
	definitions: HashMap<String, SettingDefinition>,
}

impl FrozenSettingsRegistry {
	pub fn get(&self, key: &str) -> Option<&SettingDefinition> {
		self.definitions.get(key)
	}

	/// List all registered settings
	pub fn list(&self) -> impl Iterator<Item = &SettingDefinition> {
		self.definitions.values()
	}

	/// List settings with a specific prefix
	pub fn list_by_prefix<'a>(
		&'a self,
		prefix: &'a str,
	) -> Box<dyn Iterator<Item = &'a SettingDefinition> + 'a> {
		Box::new(self.definitions.values().filter(move |def| def.key.starts_with(prefix)))
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}


// vim: ts=4
