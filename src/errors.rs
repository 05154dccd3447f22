//! Unified error types for the crate.
//!
//! Client-side failures (`Validation`, `InvalidState`, `Config`) are raised
//! before any request is sent. `Remote` carries an application-level
//! rejection from the service verbatim; `SessionExpired` is its
//! specialization for resumable query handles the server no longer
//! recognizes.

use thiserror::Error;

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Top-level error for index client operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum IndexError {
    /// Malformed or ambiguous input, rejected before any request is sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// A resumable query session was used in the wrong lifecycle state.
    #[error("invalid session state: {0}")]
    InvalidState(&'static str),

    /// The service rejected the request at the application level.
    #[error("remote rejection (status {status}): {message}")]
    Remote {
        /// HTTP status reported by the service.
        status: u16,
        /// Error message from the response envelope.
        message: String,
    },

    /// The server no longer recognizes a resumable query handle, e.g.
    /// because the idle timeout elapsed between calls.
    #[error("resumable query session expired: {0}")]
    SessionExpired(String),

    /// Underlying HTTP transport error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization / deserialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response payload did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),
}
