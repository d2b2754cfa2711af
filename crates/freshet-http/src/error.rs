//! Error types shared across the request processing pipeline.

use thiserror::Error;

/// Result type for handler and middleware operations.
pub type Result<T> = std::result::Result<T, HttpError>;

/// Errors surfaced by handlers and middleware.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpError {
	/// A request builder was finalized with an unparsable URI.
	#[error("invalid request uri: {0}")]
	InvalidUri(String),

	/// Underlying I/O failure while producing a response.
	#[error("i/o error: {0}")]
	Io(#[from] std::io::Error),

	/// Handler-specific failure.
	#[error("{0}")]
	Handler(String),
}

impl HttpError {
	/// Create a handler failure from any displayable message.
	pub fn handler(message: impl Into<String>) -> Self {
		Self::Handler(message.into())
	}
}
