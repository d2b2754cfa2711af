//! Conditional GET middleware.
//!
//! Runs the negotiation engine over every successful GET/HEAD response:
//! validators already declared by the handler are trusted, otherwise an ETag
//! is computed from the response body, and a confirming client receives the
//! 304 short-circuit instead of the body.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hyper::header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use hyper::{Method, StatusCode};
use std::sync::Arc;
use tracing::trace;

use freshet_cache::CacheContext;
use freshet_http::{Handler, Middleware, Request, RequestContext, Response, Result};

/// The two conditional request headers, captured before the request is
/// handed downstream.
struct ConditionalSnapshot {
	if_none_match: Option<String>,
	if_modified_since: Option<String>,
}

impl ConditionalSnapshot {
	fn capture(request: &Request) -> Self {
		Self {
			if_none_match: request.header(&IF_NONE_MATCH).map(str::to_owned),
			if_modified_since: request.header(&IF_MODIFIED_SINCE).map(str::to_owned),
		}
	}
}

impl RequestContext for ConditionalSnapshot {
	fn header(&self, name: &HeaderName) -> Option<&str> {
		if *name == IF_NONE_MATCH {
			self.if_none_match.as_deref()
		} else if *name == IF_MODIFIED_SINCE {
			self.if_modified_since.as_deref()
		} else {
			None
		}
	}
}

/// Conditional GET middleware.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use freshet_middleware::ConditionalGetMiddleware;
/// use freshet_http::{Handler, Middleware, Request, Response};
/// use hyper::StatusCode;
///
/// struct TestHandler;
///
/// #[async_trait::async_trait]
/// impl Handler for TestHandler {
///     async fn handle(&self, _request: Request) -> freshet_http::Result<Response> {
///         Ok(Response::ok().with_body("content"))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let middleware = ConditionalGetMiddleware::new();
/// let handler = Arc::new(TestHandler);
/// let request = Request::builder().uri("/api/resource").build().unwrap();
///
/// let response = middleware.process(request, handler).await.unwrap();
/// assert_eq!(response.status, StatusCode::OK);
/// assert!(response.headers.contains_key(hyper::header::ETAG));
/// # });
/// ```
pub struct ConditionalGetMiddleware {
	/// Whether to compute ETags from the response body when the handler
	/// declared none.
	auto_etag: bool,
}

impl ConditionalGetMiddleware {
	/// Create the middleware with automatic ETag computation enabled.
	pub fn new() -> Self {
		Self { auto_etag: true }
	}

	/// Create the middleware without automatic ETag computation.
	///
	/// Use this to negotiate only on validators the handler declares itself.
	pub fn without_etag() -> Self {
		Self { auto_etag: false }
	}
}

impl Default for ConditionalGetMiddleware {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl Middleware for ConditionalGetMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let snapshot = ConditionalSnapshot::capture(&request);
		let method = request.method.clone();

		let mut response = next.handle(request).await?;

		// Only GET/HEAD responses are negotiable.
		if method != Method::GET && method != Method::HEAD {
			return Ok(response);
		}
		if !response.status.is_success() {
			return Ok(response);
		}

		let mut ctx = CacheContext::new();

		// Validators declared by the handler win over auto-hashing.
		let declared_etag = response.headers.get(ETAG).is_some();
		if let Some(etag) = response
			.headers
			.get(ETAG)
			.and_then(|v| v.to_str().ok())
			.map(str::to_owned)
		{
			ctx.declare_etag(&snapshot, &mut response, etag);
		}
		if let Some(modified) = response
			.headers
			.get(LAST_MODIFIED)
			.and_then(|v| v.to_str().ok())
			.and_then(parse_http_date)
		{
			ctx.declare_last_modified(&snapshot, &mut response, modified);
		}

		if self.auto_etag {
			ctx.enable_auto_negotiation();
		}

		// Replay the body through the context so auto-hashing sees every
		// chunk the handler produced.
		let body = std::mem::take(&mut response.body);
		ctx.write_body(&mut response, &body);
		ctx.finalize(&snapshot, &mut response);

		if response.status == StatusCode::NOT_MODIFIED {
			trace!(declared_etag, "conditional request confirmed, served 304");
		}

		Ok(response)
	}
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
	httpdate::parse_http_date(value).ok().map(DateTime::from)
}
