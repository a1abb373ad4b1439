//! Common utilities shared across cindex crates: error taxonomy helpers,
//! correlation IDs, error sanitization, and process bootstrap.

pub mod error;
pub mod error_sanitizer;
pub mod init;
pub mod tracing;

pub use error::{CommonError, ErrorContext};
pub use error_sanitizer::{sanitize_error, sanitize_with_message};
pub use tracing::CorrelationId;
