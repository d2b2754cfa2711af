//! ETag digests for response bodies and file metadata.

use sha2::{Digest, Sha256};
use std::time::UNIX_EPOCH;

use freshet_http::FileStat;

/// Incremental digest over the bytes written to a response body.
///
/// One hasher is created per body stream; [`EtagHasher::finalize`] consumes
/// it, so a closed digest cannot be updated again.
///
/// # Examples
///
/// ```
/// use freshet_cache::EtagHasher;
///
/// let mut hasher = EtagHasher::new();
/// hasher.update(b"chunk one");
/// hasher.update(b"chunk two");
/// let etag = hasher.finalize();
/// assert!(etag.starts_with('"') && etag.ends_with('"'));
/// ```
pub struct EtagHasher {
	inner: Sha256,
}

impl EtagHasher {
	/// Create a hasher for a new body stream.
	pub fn new() -> Self {
		Self {
			inner: Sha256::new(),
		}
	}

	/// Fold a chunk into the running digest.
	pub fn update(&mut self, chunk: &[u8]) {
		self.inner.update(chunk);
	}

	/// Close the computation and return the quoted hex digest.
	pub fn finalize(self) -> String {
		let result = self.inner.finalize();
		format!("\"{}\"", hex::encode(&result[..16]))
	}
}

impl Default for EtagHasher {
	fn default() -> Self {
		Self::new()
	}
}

/// ETag for a watched file, computed from stat metadata only.
///
/// The digest covers a serialized form of the file's size and modification
/// time rather than its contents, so large files are never read just to
/// produce a validator. Identical stat snapshots always produce the same
/// digest.
pub fn metadata_etag(stat: &FileStat) -> String {
	let mtime = stat
		.modified
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_nanos())
		.unwrap_or(0);

	let mut hasher = EtagHasher::new();
	hasher.update(format!("{}:{}", stat.size, mtime).as_bytes());
	hasher.finalize()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::time::{Duration, SystemTime};

	#[rstest]
	fn test_identical_streams_produce_identical_digests() {
		let mut first = EtagHasher::new();
		first.update(b"hello, ");
		first.update(b"world");

		let mut second = EtagHasher::new();
		second.update(b"hello, world");

		assert_eq!(first.finalize(), second.finalize());
	}

	#[rstest]
	fn test_different_streams_produce_different_digests() {
		let mut first = EtagHasher::new();
		first.update(b"alpha");

		let mut second = EtagHasher::new();
		second.update(b"beta");

		assert_ne!(first.finalize(), second.finalize());
	}

	#[rstest]
	fn test_metadata_etag_is_stable() {
		let stat = FileStat {
			size: 1024,
			modified: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
		};

		assert_eq!(metadata_etag(&stat), metadata_etag(&stat));
	}

	#[rstest]
	fn test_metadata_etag_tracks_size_and_mtime() {
		let base = FileStat {
			size: 1024,
			modified: SystemTime::now(),
		};
		let grown = FileStat {
			size: 2048,
			..base
		};
		let touched = FileStat {
			modified: base.modified + Duration::from_secs(1),
			..base
		};

		assert_ne!(metadata_etag(&base), metadata_etag(&grown));
		assert_ne!(metadata_etag(&base), metadata_etag(&touched));
	}
}
