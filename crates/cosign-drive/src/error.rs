//! Error types for the external document store.

use thiserror::Error;

/// Errors surfaced by the external document store.
///
/// Adapters return these unchanged; no layer in this crate retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    /// The document, permission or user is unknown to the external store.
    #[error("not found upstream: {0}")]
    NotFound(String),

    /// The external store rejected the call.
    #[error("upstream rejected request ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// The call never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The call did not complete within its deadline.
    #[error("upstream call timed out")]
    Timeout,

    /// The response body did not have the expected shape.
    #[error("malformed upstream response: {0}")]
    Decode(String),

    /// Client misconfiguration (bad base URL, missing token).
    #[error("invalid drive configuration: {0}")]
    Config(String),
}

/// Result type for external store operations.
pub type Result<T> = std::result::Result<T, DriveError>;
