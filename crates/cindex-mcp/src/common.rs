//! Error-mapping helpers shared by every handler: turn a domain error into
//! an `agenterra_rmcp::Error` without leaking internal detail across the
//! tool boundary (spec §7 "Ambient detail").

use agenterra_rmcp::model::{ErrorCode, ErrorData};
use cindex_common::sanitize_with_message;

/// Maps any domain error (store/backend/index/retrieval) to an MCP error,
/// logging the full detail server-side under `context` and returning only a
/// correlation-id-bearing message to the caller.
pub fn domain_err<E: std::fmt::Display>(error: E, context: &str) -> agenterra_rmcp::Error {
    let message = sanitize_with_message(error, context, "the operation failed");
    agenterra_rmcp::Error::from(ErrorData::new(ErrorCode::INTERNAL_ERROR, message, None))
}

/// Maps a bad-input condition (missing/invalid parameter) to an MCP error.
/// No sanitization: the message is already safe, it just names which
/// parameter was wrong.
pub fn validation_err(message: impl Into<String>) -> agenterra_rmcp::Error {
    agenterra_rmcp::Error::from(ErrorData::new(ErrorCode::INVALID_PARAMS, message.into(), None))
}
