//! Error types for the cache core.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from watched-file operations.
///
/// `NotFound` is a recoverable sentinel, not a fatal condition: request
/// handling continues and the affected path is treated as always-changed,
/// which favors re-serving over incorrectly confirming a stale cache.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WatchError {
	/// The watched path does not exist or could not be stat'ed.
	#[error("watched file not found: {0}")]
	NotFound(PathBuf),
}
