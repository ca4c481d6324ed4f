//! Error type shared by the resolution layer, the wrapper, and all adapters

use std::fmt;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	NotImplemented,
	Timeout,
	ConfigError(String),
	ValidationError(String),
	/// Programming-logic misuse; never retried
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		match err.kind() {
			std::io::ErrorKind::NotFound => Self::NotFound,
			_ => Self::Io(err),
		}
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::NotImplemented => write!(f, "operation not implemented by this file system"),
			Error::Timeout => write!(f, "operation timed out"),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}


// vim: ts=4
