//! HTTP response representation and the mutable response seam.

use bytes::{Bytes, BytesMut};
use hyper::header::HeaderName;
use hyper::{HeaderMap, StatusCode};

/// Mutable view of an in-flight response.
///
/// This is the capability surface the cache core mutates: header get/set,
/// status, body writes, and finalization. Finalization is idempotent: the
/// first call wins, and every mutation after it is ignored, so negotiation
/// helpers may be called defensively without corrupting output that has
/// already been committed.
pub trait ResponseContext {
	/// Returns the header value as a string, if present and valid UTF-8.
	fn header(&self, name: &HeaderName) -> Option<&str>;

	/// Set a header. Ignored after finalization, and for values that cannot
	/// appear on the wire.
	fn set_header(&mut self, name: HeaderName, value: &str);

	/// Set the status code. Ignored after finalization.
	fn set_status(&mut self, status: StatusCode);

	/// Append a chunk to the response body. Ignored after finalization.
	fn write_body(&mut self, chunk: &[u8]);

	/// Commit the response. The first call wins: `status` and `body`
	/// override the accumulated values when given, and the response is
	/// sealed against further mutation. Subsequent calls are no-ops.
	fn finalize(&mut self, status: Option<StatusCode>, body: Option<Bytes>);

	/// Whether the response has been committed.
	fn is_finalized(&self) -> bool;
}

/// Buffered HTTP response.
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Set once the response has been committed; guards all later mutation.
	finalized: bool,
}

impl Response {
	/// Create a new response with the given status code.
	///
	/// # Examples
	///
	/// ```
	/// use freshet_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
			finalized: false,
		}
	}

	/// Create a response with HTTP 200 OK status.
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a response with HTTP 304 Not Modified status.
	pub fn not_modified() -> Self {
		Self::new(StatusCode::NOT_MODIFIED)
	}

	/// Replace the body.
	///
	/// # Examples
	///
	/// ```
	/// use freshet_http::Response;
	///
	/// let response = Response::ok().with_body("content");
	/// assert_eq!(&response.body[..], b"content");
	/// ```
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Add a header, ignoring values that cannot appear on the wire.
	pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
		if let Ok(value) = value.parse() {
			self.headers.insert(name, value);
		}
		self
	}
}

impl ResponseContext for Response {
	fn header(&self, name: &HeaderName) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	fn set_header(&mut self, name: HeaderName, value: &str) {
		if self.finalized {
			return;
		}
		if let Ok(value) = value.parse() {
			self.headers.insert(name, value);
		}
	}

	fn set_status(&mut self, status: StatusCode) {
		if self.finalized {
			return;
		}
		self.status = status;
	}

	fn write_body(&mut self, chunk: &[u8]) {
		if self.finalized {
			return;
		}
		let mut buf = BytesMut::with_capacity(self.body.len() + chunk.len());
		buf.extend_from_slice(&self.body);
		buf.extend_from_slice(chunk);
		self.body = buf.freeze();
	}

	fn finalize(&mut self, status: Option<StatusCode>, body: Option<Bytes>) {
		if self.finalized {
			return;
		}
		if let Some(status) = status {
			self.status = status;
		}
		if let Some(body) = body {
			self.body = body;
		}
		self.finalized = true;
	}

	fn is_finalized(&self) -> bool {
		self.finalized
	}
}
