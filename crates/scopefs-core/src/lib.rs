//! Host side of scopefs: configuration store, sessions, the virtual file
//! system, and the category-aware wrapper that scopes timeout and retry
//! settings to each file system operation.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod config;
pub mod core_settings;
pub mod database;
pub mod extension;
pub mod prelude;
pub mod session;
pub mod vfs;
pub mod wrapper;

pub use crate::database::{Database, DatabaseBuilder, DatabaseSource};
pub use crate::session::Session;
pub use crate::wrapper::CategoryAwareFileSystem;

// vim: ts=4
