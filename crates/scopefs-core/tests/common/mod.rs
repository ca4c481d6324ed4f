//! Test environment builders and helpers
//!
//! Each test gets its own database with a recording backend posing as
//! `HTTPFileSystem`, serving `http://` paths from a temporary directory.
//! The TempDir is returned inside the environment so cleanup happens when
//! the test ends.

#![allow(dead_code)]

use std::sync::Arc;

use scopefs_core::core_settings::CategoryDefaults;
use scopefs_core::{Database, DatabaseBuilder};
use scopefs_fs_adapter_local::LocalFileSystem;
use scopefs_fs_adapter_local::record::{RecordFileSystem, RecordedParams};
use scopefs_types::category::OperationCategory;
use tempfile::TempDir;

pub struct TestEnv {
	pub db: Arc<Database>,
	pub http: Arc<RecordFileSystem>,
	pub temp: TempDir,
}

impl TestEnv {
	/// `http://` URL of `name` inside the temporary directory
	pub fn url(&self, name: &str) -> String {
		format!("http://{}", self.temp.path().join(name).display())
	}

	/// Create `name` with some content, bypassing the file systems
	pub async fn touch(&self, name: &str) -> String {
		tokio::fs::write(self.temp.path().join(name), b"content")
			.await
			.expect("Failed to create test file");
		self.url(name)
	}

	pub fn recorded(&self, url: &str) -> RecordedParams {
		self.http
			.recorded_params(url)
			.unwrap_or_else(|| panic!("Nothing recorded for {}", url))
	}
}

/// Common test setup helper
pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

/// Environment with the timeout/retry extension loaded using `defaults`
pub fn create_test_env(
	defaults: Option<CategoryDefaults>,
	configure: impl FnOnce(&mut DatabaseBuilder),
) -> TestEnv {
	setup_test_logging();
	let temp = TempDir::new().expect("Failed to create temp directory");
	let http = Arc::new(RecordFileSystem::with_name("HTTPFileSystem", &["http://"]));

	let mut builder = Database::builder();
	builder
		.default_file_system(Arc::new(LocalFileSystem::new()))
		.sub_system(Arc::clone(&http) as _);
	if let Some(defaults) = defaults {
		builder.timeout_retry_extension(defaults);
	}
	configure(&mut builder);
	let db = builder.build().expect("Failed to build database");

	TestEnv { db, http, temp }
}

pub fn expect_params(
	category: OperationCategory,
	timeout: u64,
	retries: u64,
	retry_wait_ms: u64,
	retry_backoff: f64,
) -> RecordedParams {
	RecordedParams { category, timeout, retries, retry_wait_ms, retry_backoff }
}

// vim: ts=4
