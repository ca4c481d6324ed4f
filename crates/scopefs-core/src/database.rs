//! Database instance: configuration store, file system, and the default
//! setting source used when an operation is called without one

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::ConfigStore;
use crate::core_settings::{self, CategoryDefaults};
use crate::extension;
use crate::prelude::*;
use crate::session::Session;
use crate::vfs::VirtualFileSystem;
use scopefs_types::file_system::FileSystem;
use scopefs_types::setting_source::{SettingLookup, SettingSource};
use scopefs_types::settings::{SettingDefinition, SettingValue, SettingsRegistry};
use scopefs_types::types::HttpUtil;

/// Setting source bound to the database-wide configuration
#[derive(Debug, Clone)]
pub struct DatabaseSource {
	config: Arc<ConfigStore>,
	http_util: Arc<HttpUtil>,
}

impl DatabaseSource {
	pub fn new(config: Arc<ConfigStore>, http_util: Arc<HttpUtil>) -> Self {
		Self { config, http_util }
	}
}

impl SettingSource for DatabaseSource {
	fn try_get_setting(&self, key: &str) -> ClResult<Option<SettingLookup>> {
		Ok(self.config.get(key).map(SettingLookup::global))
	}

	fn http_util(&self) -> Option<Arc<HttpUtil>> {
		Some(Arc::clone(&self.http_util))
	}

	fn span(&self) -> tracing::Span {
		debug_span!("scopefs", source = "database")
	}
}

#[derive(Debug)]
pub struct Database {
	config: Arc<ConfigStore>,
	http_util: Arc<HttpUtil>,
	vfs: Arc<VirtualFileSystem>,
	next_session_id: AtomicU64,
}

impl Database {
	pub fn builder() -> DatabaseBuilder {
		DatabaseBuilder::new()
	}

	pub fn config(&self) -> &Arc<ConfigStore> {
		&self.config
	}

	pub fn http_util(&self) -> &Arc<HttpUtil> {
		&self.http_util
	}

	pub fn file_system(&self) -> &Arc<VirtualFileSystem> {
		&self.vfs
	}

	/// Fresh source reading the current database-wide configuration
	pub fn default_source(&self) -> DatabaseSource {
		DatabaseSource::new(Arc::clone(&self.config), Arc::clone(&self.http_util))
	}

	/// Open a session with its own local setting overrides
	pub fn connect(self: &Arc<Self>, user: Option<&str>) -> Session {
		let session_id = self.next_session_id.fetch_add(1, Ordering::Relaxed) + 1;
		Session::new(Arc::clone(self), session_id, user)
	}
}

pub struct DatabaseBuilder {
	http_util: HttpUtil,
	category_defaults: Option<CategoryDefaults>,
	default_fs: Option<Arc<dyn FileSystem>>,
	sub_systems: Vec<Arc<dyn FileSystem>>,
	definitions: Vec<SettingDefinition>,
	settings: Vec<(String, SettingValue)>,
	settings_json: Option<serde_json::Value>,
}

impl DatabaseBuilder {
	pub fn new() -> Self {
		DatabaseBuilder {
			http_util: HttpUtil::default(),
			category_defaults: None,
			default_fs: None,
			sub_systems: Vec::new(),
			definitions: Vec::new(),
			settings: Vec::new(),
			settings_json: None,
		}
	}

	// Opts
	pub fn http_util(&mut self, http_util: HttpUtil) -> &mut Self {
		self.http_util = http_util;
		self
	}

	/// Load the timeout/retry extension: register the per-category settings
	/// and wrap the remote file systems once the database is built
	pub fn timeout_retry_extension(&mut self, defaults: CategoryDefaults) -> &mut Self {
		self.category_defaults = Some(defaults);
		self
	}

	pub fn default_file_system(&mut self, fs: Arc<dyn FileSystem>) -> &mut Self {
		self.default_fs = Some(fs);
		self
	}

	pub fn sub_system(&mut self, fs: Arc<dyn FileSystem>) -> &mut Self {
		self.sub_systems.push(fs);
		self
	}

	/// Register an additional setting definition
	pub fn register(&mut self, def: SettingDefinition) -> &mut Self {
		self.definitions.push(def);
		self
	}

	/// Initial database-wide value of a setting
	pub fn setting(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> &mut Self {
		self.settings.push((key.into(), value.into()));
		self
	}

	/// Initial values as a JSON object, applied before `setting` values
	pub fn settings_json(&mut self, json: serde_json::Value) -> &mut Self {
		self.settings_json = Some(json);
		self
	}

	pub fn build(&mut self) -> ClResult<Arc<Database>> {
		let mut registry = SettingsRegistry::new();
		core_settings::register_http_settings(&mut registry)?;
		if let Some(defaults) = &self.category_defaults {
			core_settings::register_settings(&mut registry, defaults)?;
		}
		for def in self.definitions.drain(..) {
			registry.register(def)?;
		}

		let config = Arc::new(ConfigStore::new(registry.freeze()));
		if let Some(json) = self.settings_json.take() {
			config.apply_json(&json)?;
		}
		for (key, value) in self.settings.drain(..) {
			config.set(&key, value)?;
		}

		let vfs = Arc::new(VirtualFileSystem::new(self.default_fs.take()));
		for fs in self.sub_systems.drain(..) {
			vfs.register_sub_system(fs)?;
		}

		let db = Arc::new(Database {
			config,
			http_util: Arc::new(self.http_util.clone()),
			vfs,
			next_session_id: AtomicU64::new(0),
		});

		if self.category_defaults.is_some() {
			extension::load(&db)?;
		}

		info!("Database ready, file systems: {:?}", db.vfs.list_sub_systems());
		Ok(db)
	}
}

impl Default for DatabaseBuilder {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
