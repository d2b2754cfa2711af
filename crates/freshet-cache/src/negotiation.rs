//! Conditional-request decision logic.
//!
//! Pure comparisons between declared validators and the inbound conditional
//! headers. Absent or malformed headers never match: the engine fails open
//! toward "changed" rather than incorrectly confirming a stale cache.

use chrono::{DateTime, Utc};
use hyper::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH};

use freshet_http::RequestContext;

/// Validator state accumulated for one in-flight response.
///
/// Exactly one instance exists per response, owned by the request's
/// [`CacheContext`](crate::CacheContext). Re-declarations overwrite: only the
/// last declared ETag/Last-Modified is evaluated at finalize time.
#[derive(Debug, Default, Clone)]
pub struct Validator {
	/// Last declared (or auto-computed) ETag.
	pub etag: Option<String>,
	/// Last declared Last-Modified timestamp.
	pub last_modified: Option<DateTime<Utc>>,
	/// Whether negotiation bookkeeping is active for this response.
	pub auto_enabled: bool,
	/// Set once the response has been committed; guards later mutation.
	pub finalized: bool,
}

/// True iff a declared ETag exactly matches the request's `If-None-Match`.
///
/// The comparison is case-sensitive and literal; weak validators (`W/"..."`)
/// are not parsed and only match their exact textual form.
pub fn etag_matches(declared: Option<&str>, if_none_match: Option<&str>) -> bool {
	matches!((declared, if_none_match), (Some(d), Some(h)) if d == h)
}

/// True iff the resource is unchanged relative to `If-Modified-Since`.
///
/// Holds when the header is present, parses as an HTTP-date, and the declared
/// modification time is at or before it.
pub fn unmodified_since(
	declared: Option<DateTime<Utc>>,
	if_modified_since: Option<&str>,
) -> bool {
	let (Some(last_modified), Some(raw)) = (declared, if_modified_since) else {
		return false;
	};
	match parse_http_date(raw) {
		Some(since) => last_modified <= since,
		None => false,
	}
}

/// Combined finalize-time verdict: is the client's cached copy still valid?
///
/// ETag takes precedence: Last-Modified is only consulted when no ETag was
/// declared.
pub fn verdict(validator: &Validator, request: &dyn RequestContext) -> bool {
	if validator.etag.is_some() {
		etag_matches(validator.etag.as_deref(), request.header(&IF_NONE_MATCH))
	} else {
		unmodified_since(
			validator.last_modified,
			request.header(&IF_MODIFIED_SINCE),
		)
	}
}

pub(crate) fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
	httpdate::parse_http_date(value).ok().map(DateTime::from)
}
