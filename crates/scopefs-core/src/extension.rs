//! Timeout/retry extension loading
//!
//! Replaces every registered remote file system with a
//! [`CategoryAwareFileSystem`] around it, so remote backends receive
//! category-scoped settings. Local file systems are left alone.

use std::sync::Arc;

use crate::core_settings::category_settings_registered;
use crate::database::Database;
use crate::prelude::*;
use crate::wrapper::CategoryAwareFileSystem;
use scopefs_types::file_system::FileSystem;

/// Sub-systems that talk to a remote service
pub const REMOTE_FILE_SYSTEMS: [&str; 3] = ["HTTPFileSystem", "S3FileSystem", "HuggingFaceFileSystem"];

/// Wrap the remote sub-systems of `db`. Returns how many were wrapped; a
/// second call finds only wrapped names and wraps nothing.
pub fn load(db: &Database) -> ClResult<usize> {
	if !category_settings_registered(db.config().registry()) {
		return Err(Error::ConfigError(
			"Per-category timeout settings are not registered".into(),
		));
	}

	let vfs = db.file_system();
	let registered = vfs.list_sub_systems();
	let pending: Vec<&str> = REMOTE_FILE_SYSTEMS
		.into_iter()
		.filter(|name| registered.iter().any(|r| r == name))
		.collect();

	// Collisions are rejected before anything is extracted
	for name in &pending {
		let wrapped_name = CategoryAwareFileSystem::wrapped_name(name);
		if registered.contains(&wrapped_name) {
			return Err(Error::ConfigError(format!(
				"Cannot wrap '{}': file system '{}' is already registered",
				name, wrapped_name
			)));
		}
	}

	let mut wrapped = 0;
	for name in pending {
		let Some(inner) = vfs.extract_sub_system(name) else {
			debug!("File system '{}' not registered, skipping", name);
			continue;
		};
		let wrapper = CategoryAwareFileSystem::for_database(Arc::clone(&inner), db);
		info!("Wrapping file system '{}' as '{}'", name, wrapper.name());
		if let Err(err) = vfs.register_sub_system(Arc::new(wrapper)) {
			warn!("Failed to wrap file system '{}', restoring it: {}", name, err);
			vfs.register_sub_system(inner)?;
			return Err(err);
		}
		wrapped += 1;
	}
	Ok(wrapped)
}


// vim: ts=4
