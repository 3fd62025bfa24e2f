//! # Error Handling
//!
//! Centralized error types for the local server core.
//! Uses `thiserror` for ergonomic error definitions.
//!
//! Request-level failures are never reported through this type: the server
//! core resolves them into a [`StatusDescriptor`](crate::status::StatusDescriptor)
//! and answers the client. Only transport and setup faults end up here.

use thiserror::Error;

/// Result type alias for local server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the local server runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Server failed to bind to the specified address
    #[error("Failed to bind server to {address}: {source}")]
    BindError {
        /// The address we tried to bind to
        address: String,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Raw bytes could not be parsed into a request
    #[error("Malformed request: {reason}")]
    Parse {
        /// What the parser rejected
        reason: String,
    },

    /// The request head did not fit into the single bounded read
    #[error("Incomplete request head")]
    PartialRequest,

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<httparse::Error> for Error {
    fn from(err: httparse::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
