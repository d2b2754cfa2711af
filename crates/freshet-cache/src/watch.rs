//! Process-wide registry of watched files with TTL-based staleness.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime};
use tracing::debug;

use freshet_http::{FileSystem, OsFileSystem, RequestContext, ResponseContext};

use crate::context::CacheContext;
use crate::error::WatchError;
use crate::etag::metadata_etag;

/// Cached descriptor for one watched file.
///
/// Entries are only ever replaced wholesale, never mutated in place:
/// expiry-triggered refresh and explicit re-watch both delete and recreate.
/// `expires_at` always derives from the file's modification time at the
/// moment of (re)caching, not from request time.
#[derive(Debug, Clone)]
pub struct WatchedFileEntry {
	/// Watched path, the registry key.
	pub path: PathBuf,
	/// When this entry was (re)cached.
	pub created_at: SystemTime,
	/// Modification time reported by the filesystem.
	pub modified_at: SystemTime,
	/// `modified_at` + configured max-age.
	pub expires_at: SystemTime,
	/// Digest of the file's stat metadata.
	pub etag: String,
	/// Opaque payload attached by the caller; dropped on replacement.
	pub aux: Option<Bytes>,
}

impl WatchedFileEntry {
	fn is_expired(&self) -> bool {
		SystemTime::now() > self.expires_at
	}
}

/// Registry of watched files shared across requests.
///
/// Created once at process start and injected into request handling. The
/// path→entry map lives behind a lock, and the whole
/// lookup/expiry-check/replace sequence runs under it so two concurrent
/// requests can neither double re-stat an expired entry nor observe a
/// half-replaced one.
///
/// # Examples
///
/// ```no_run
/// use freshet_cache::FileWatchCache;
/// use std::time::Duration;
///
/// let cache = FileWatchCache::new(Duration::from_secs(60));
/// let entry = cache.watch("/var/www/index.html").unwrap();
/// assert!(cache.is_watching("/var/www/index.html"));
/// assert_eq!(entry.expires_at, entry.modified_at + Duration::from_secs(60));
/// ```
pub struct FileWatchCache {
	entries: RwLock<HashMap<PathBuf, WatchedFileEntry>>,
	fs: Arc<dyn FileSystem>,
	max_age: Duration,
}

impl FileWatchCache {
	/// Create a cache over the real filesystem.
	pub fn new(max_age: Duration) -> Self {
		Self::with_filesystem(max_age, Arc::new(OsFileSystem))
	}

	/// Create a cache over a custom filesystem implementation.
	pub fn with_filesystem(max_age: Duration, fs: Arc<dyn FileSystem>) -> Self {
		Self {
			entries: RwLock::new(HashMap::new()),
			fs,
			max_age,
		}
	}

	/// The configured entry max-age.
	pub fn max_age(&self) -> Duration {
		self.max_age
	}

	/// Start watching `path`, replacing any existing entry.
	///
	/// Stats the file and caches its metadata digest together with the
	/// expiry horizon derived from the file's modification time.
	///
	/// # Errors
	///
	/// [`WatchError::NotFound`] when the path does not exist or cannot be
	/// stat'ed; the caller decides the fallback (typically: serve uncached).
	pub fn watch(&self, path: impl AsRef<Path>) -> Result<WatchedFileEntry, WatchError> {
		let path = path.as_ref();
		let entry = self.build_entry(path)?;

		let mut entries = self.entries.write().unwrap();
		entries.insert(path.to_path_buf(), entry.clone());
		debug!(path = %path.display(), "watching file");
		Ok(entry)
	}

	/// Whether `path` currently has a cached entry.
	pub fn is_watching(&self, path: impl AsRef<Path>) -> bool {
		let entries = self.entries.read().unwrap();
		entries.contains_key(path.as_ref())
	}

	/// Stop watching `path`. No-op when it was never watched.
	pub fn unwatch(&self, path: impl AsRef<Path>) {
		let mut entries = self.entries.write().unwrap();
		if entries.remove(path.as_ref()).is_some() {
			debug!(path = %path.as_ref().display(), "unwatched file");
		}
	}

	/// Snapshot of the current entry for `path`, if any.
	pub fn entry(&self, path: impl AsRef<Path>) -> Option<WatchedFileEntry> {
		let entries = self.entries.read().unwrap();
		entries.get(path.as_ref()).cloned()
	}

	/// Attach an opaque payload to the entry for `path`.
	///
	/// Returns false when the path is not being watched. The payload is
	/// dropped whenever the entry is replaced.
	pub fn set_aux(&self, path: impl AsRef<Path>, aux: Bytes) -> bool {
		let mut entries = self.entries.write().unwrap();
		match entries.get_mut(path.as_ref()) {
			Some(entry) => {
				entry.aux = Some(aux);
				true
			}
			None => false,
		}
	}

	/// Has the watched file changed relative to the current request?
	///
	/// - An unwatched path is conservatively always-changed.
	/// - When `force` is set or the entry's expiry has passed, the entry is
	///   discarded and rebuilt from a fresh stat (exactly one re-stat per
	///   call), then the fresh entry is evaluated.
	/// - Otherwise the stored validators are declared to the negotiation
	///   context for this request, and the file counts as unchanged only
	///   when *both* agree: the Last-Modified comparison and the ETag match.
	///   A file can keep the same metadata digest across content changes or
	///   vice versa, so a single agreeing signal is not trusted.
	pub fn is_changed(
		&self,
		path: impl AsRef<Path>,
		force: bool,
		ctx: &mut CacheContext,
		request: &dyn RequestContext,
		response: &mut dyn ResponseContext,
	) -> bool {
		let path = path.as_ref();
		let Some(entry) = self.refreshed_entry(path, force) else {
			return true;
		};

		let modified: DateTime<Utc> = entry.modified_at.into();
		let unmodified = ctx.declare_last_modified(request, response, modified);
		let etag_matched = ctx.declare_etag(request, response, entry.etag.clone());

		!(unmodified && etag_matched)
	}

	/// Look up `path`, refreshing the entry first when forced or expired.
	///
	/// Runs under the write lock for the whole check-and-replace so
	/// concurrent requests settle on a single re-stat. Returns None when the
	/// path is unwatched or the refresh found the file gone.
	fn refreshed_entry(&self, path: &Path, force: bool) -> Option<WatchedFileEntry> {
		let mut entries = self.entries.write().unwrap();

		let current = entries.get(path)?;
		if !force && !current.is_expired() {
			return Some(current.clone());
		}

		debug!(path = %path.display(), force, "refreshing watched file");
		match self.build_entry(path) {
			Ok(fresh) => {
				entries.insert(path.to_path_buf(), fresh.clone());
				Some(fresh)
			}
			Err(_) => {
				// File is gone: drop the stale entry and report changed.
				entries.remove(path);
				None
			}
		}
	}

	fn build_entry(&self, path: &Path) -> Result<WatchedFileEntry, WatchError> {
		if !self.fs.exists(path) {
			return Err(WatchError::NotFound(path.to_path_buf()));
		}
		let stat = self
			.fs
			.stat(path)
			.map_err(|_| WatchError::NotFound(path.to_path_buf()))?;

		Ok(WatchedFileEntry {
			path: path.to_path_buf(),
			created_at: SystemTime::now(),
			modified_at: stat.modified,
			expires_at: stat.modified + self.max_age,
			etag: metadata_etag(&stat),
			aux: None,
		})
	}
}
