//! Client session with local setting overrides

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::database::Database;
use crate::prelude::*;
use scopefs_types::setting_source::{SettingLookup, SettingSource};
use scopefs_types::settings::{SettingScope, SettingValue};
use scopefs_types::types::{HttpUtil, SessionContext};

pub struct Session {
	db: Arc<Database>,
	context: SessionContext,
	overrides: RwLock<HashMap<String, SettingValue>>,
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("context", &self.context)
			.field("overrides", &self.overrides.read().len())
			.finish()
	}
}

impl Session {
	pub(crate) fn new(db: Arc<Database>, session_id: u64, user: Option<&str>) -> Self {
		debug!(session_id, "Session opened");
		Self {
			db,
			context: SessionContext { session_id, user: user.map(Into::into) },
			overrides: RwLock::new(HashMap::new()),
		}
	}

	pub fn database(&self) -> &Arc<Database> {
		&self.db
	}

	pub fn context(&self) -> &SessionContext {
		&self.context
	}

	/// Override `key` for this session only (`SET SESSION`)
	pub fn set_local(&self, key: &str, value: impl Into<SettingValue>) -> ClResult<()> {
		let value = value.into();
		let def = self.db.config().check(key, &value)?;
		if def.scope != SettingScope::Session {
			return Err(Error::ConfigError(format!(
				"Setting '{}' cannot be overridden per session",
				key
			)));
		}
		debug!(session_id = self.context.session_id, "Session override '{}' = {:?}", key, value);
		self.overrides.write().insert(key.to_string(), value);
		Ok(())
	}

	/// Drop a session override; returns whether one was set
	pub fn reset_local(&self, key: &str) -> bool {
		self.overrides.write().remove(key).is_some()
	}
}

impl SettingSource for Session {
	fn try_get_setting(&self, key: &str) -> ClResult<Option<SettingLookup>> {
		if let Some(value) = self.overrides.read().get(key) {
			return Ok(Some(SettingLookup::session(value.clone())));
		}
		Ok(self.db.config().get(key).map(SettingLookup::global))
	}

	fn session(&self) -> Option<&SessionContext> {
		Some(&self.context)
	}

	fn http_util(&self) -> Option<Arc<HttpUtil>> {
		Some(Arc::clone(self.db.http_util()))
	}

	fn span(&self) -> tracing::Span {
		debug_span!("scopefs", session_id = self.context.session_id)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::core_settings::{CategoryDefaults, RETRY_ON_TIMEOUT};
	use scopefs_types::setting_source::{HTTP_TIMEOUT, SettingSourceExt};

	fn db() -> Arc<Database> {
		let db = Database::builder().timeout_retry_extension(CategoryDefaults::default()).build();
		let Ok(db) = db else { panic!("build failed") };
		db
	}

	#[test]
	fn test_override_scope() {
		let db = db();
		let session = db.connect(Some("alice"));
		assert_eq!(session.context().user.as_deref(), Some("alice"));

		let lookup = session.try_get_setting(HTTP_TIMEOUT).ok().flatten();
		assert_eq!(lookup, Some(SettingLookup::global(30u64)));

		assert!(session.set_local(HTTP_TIMEOUT, 12u64).is_ok());
		let lookup = session.try_get_setting(HTTP_TIMEOUT).ok().flatten();
		assert_eq!(lookup, Some(SettingLookup::session(12u64)));

		// Other sessions keep the database value
		let other = db.connect(None);
		assert_eq!(other.get_u64(HTTP_TIMEOUT).ok().flatten(), Some(30));
		assert_ne!(other.context().session_id, session.context().session_id);

		assert!(session.reset_local(HTTP_TIMEOUT));
		assert!(!session.reset_local(HTTP_TIMEOUT));
		assert_eq!(session.get_u64(HTTP_TIMEOUT).ok().flatten(), Some(30));
	}

	#[test]
	fn test_set_local_validates() {
		let db = db();
		let session = db.connect(None);
		assert!(matches!(session.set_local("nope", 1u64), Err(Error::ConfigError(_))));
		assert!(matches!(session.set_local(HTTP_TIMEOUT, true), Err(Error::ConfigError(_))));
		assert!(matches!(session.set_local(RETRY_ON_TIMEOUT, false), Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_unknown_key() {
		let db = db();
		let session = db.connect(None);
		assert!(matches!(session.try_get_setting("nope"), Ok(None)));
		assert!(session.session().is_some());
	}
}

// vim: ts=4
