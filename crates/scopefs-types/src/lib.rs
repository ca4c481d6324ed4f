//! Shared types, adapter traits, and operation-scoped setting resolution.
//!
//! This crate contains everything a file system backend needs to depend on:
//! the [`file_system::FileSystem`] trait, the setting source capability it
//! reads its policy through, and the [`opener::SettingResolver`] that scopes
//! generic timeout/retry lookups to an operation category. Backends depend on
//! this crate only; the wrapper and the configuration store live in
//! `scopefs-core`.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod category;
pub mod error;
pub mod file_system;
pub mod opener;
pub mod policy;
pub mod prelude;
pub mod setting_source;
pub mod settings;
pub mod types;

// vim: ts=4
