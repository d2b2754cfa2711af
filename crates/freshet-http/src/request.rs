//! HTTP request representation and the read-only header seam.

use bytes::Bytes;
use hyper::header::HeaderName;
use hyper::{HeaderMap, Method, Uri, Version};

use crate::error::{HttpError, Result};

/// Read access to inbound request headers.
///
/// The negotiation engine only ever inspects conditional headers
/// (`If-None-Match`, `If-Modified-Since`), so this is the whole surface it
/// needs from a request. Anything that can answer a header lookup, whether a
/// full [`Request`] or a small captured snapshot inside a middleware, can
/// drive negotiation.
pub trait RequestContext {
	/// Returns the header value as a string, if present and valid UTF-8.
	fn header(&self, name: &HeaderName) -> Option<&str>;
}

/// HTTP request representation handed to handlers.
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Request {
	/// Start building a request.
	///
	/// # Examples
	///
	/// ```
	/// use freshet_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/api/resource")
	///     .build()
	///     .unwrap();
	/// assert_eq!(request.path(), "/api/resource");
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	/// Path component of the request URI.
	pub fn path(&self) -> &str {
		self.uri.path()
	}
}

impl RequestContext for Request {
	fn header(&self, name: &HeaderName) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}
}

/// Builder for [`Request`].
#[derive(Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	version: Option<Version>,
	headers: HeaderMap,
	body: Bytes,
}

impl RequestBuilder {
	/// Set the request method. Defaults to `GET`.
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	/// Set the request URI.
	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	/// Set the HTTP version. Defaults to HTTP/1.1.
	pub fn version(mut self, version: Version) -> Self {
		self.version = Some(version);
		self
	}

	/// Replace the header map.
	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Add a single header, ignoring values that cannot appear on the wire.
	pub fn header(mut self, name: HeaderName, value: &str) -> Self {
		if let Ok(value) = value.parse() {
			self.headers.insert(name, value);
		}
		self
	}

	/// Set the request body.
	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Finalize the request.
	///
	/// # Errors
	///
	/// Returns [`HttpError::InvalidUri`] if the configured URI fails to parse.
	pub fn build(self) -> Result<Request> {
		let raw_uri = self.uri.unwrap_or_else(|| "/".to_string());
		let uri: Uri = raw_uri
			.parse()
			.map_err(|_| HttpError::InvalidUri(raw_uri))?;

		Ok(Request {
			method: self.method.unwrap_or(Method::GET),
			uri,
			version: self.version.unwrap_or(Version::HTTP_11),
			headers: self.headers,
			body: self.body,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use hyper::header::IF_NONE_MATCH;
	use rstest::rstest;

	#[rstest]
	fn test_builder_defaults() {
		let request = Request::builder().build().unwrap();

		assert_eq!(request.method, Method::GET);
		assert_eq!(request.path(), "/");
		assert_eq!(request.version, Version::HTTP_11);
		assert!(request.body.is_empty());
	}

	#[rstest]
	fn test_header_lookup() {
		let request = Request::builder()
			.uri("/resource")
			.header(IF_NONE_MATCH, "\"abc123\"")
			.build()
			.unwrap();

		assert_eq!(request.header(&IF_NONE_MATCH), Some("\"abc123\""));
		assert_eq!(request.header(&hyper::header::IF_MODIFIED_SINCE), None);
	}

	#[rstest]
	fn test_invalid_uri_is_rejected() {
		let result = Request::builder().uri("http://[::bad").build();
		assert!(matches!(result, Err(HttpError::InvalidUri(_))));
	}
}
