pub use scopefs_types::error::{ClResult, Error};
pub use scopefs_types::types::Timestamp;

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
