//! Per-request cache negotiation context.

use bytes::Bytes;
use chrono::{DateTime, Timelike, Utc};
use hyper::StatusCode;
use hyper::header::{CACHE_CONTROL, ETAG, EXPIRES, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use std::time::Duration;
use tracing::debug;

use freshet_http::{RequestContext, ResponseContext};

use crate::control::CacheControlConfig;
use crate::etag::EtagHasher;
use crate::negotiation::{self, Validator};

/// Body sent with a negotiated 304 short-circuit.
const NOT_MODIFIED_BODY: &[u8] = b"Cached";

/// Cache-Control attached to a 304, forcing revalidation on every request.
const REVALIDATE: &str = "private, must-revalidate, max-age=0";

/// Per-request validator registry and negotiation driver.
///
/// One `CacheContext` is created per in-flight response. It owns the
/// [`Validator`] state, the body hasher while auto-negotiation is active, and
/// the [`CacheControlConfig`], and operates on the abstract request/response
/// seams rather than replacing their methods: body writes and finalization
/// are routed *through* the context (wrap-and-delegate), which lets it
/// intercept chunks for hashing and apply the 304 short-circuit.
///
/// # Examples
///
/// ```
/// use freshet_cache::CacheContext;
/// use freshet_http::{Request, Response, ResponseContext};
/// use hyper::StatusCode;
/// use hyper::header::IF_NONE_MATCH;
///
/// let request = Request::builder()
///     .uri("/resource")
///     .header(IF_NONE_MATCH, "abc123")
///     .build()
///     .unwrap();
/// let mut response = Response::ok().with_body("full body");
/// let mut ctx = CacheContext::new();
///
/// // The declared validator already matches, so the caller could skip
/// // producing a body; finalize still emits the authoritative 304.
/// assert!(ctx.declare_etag(&request, &mut response, "abc123"));
/// ctx.finalize(&request, &mut response);
///
/// assert_eq!(response.status, StatusCode::NOT_MODIFIED);
/// assert_eq!(&response.body[..], b"Cached");
/// ```
#[derive(Default)]
pub struct CacheContext {
	validator: Validator,
	hasher: Option<EtagHasher>,
	control: CacheControlConfig,
}

impl CacheContext {
	/// Create a context for a new request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a context with a preset max-age for header composition.
	pub fn with_max_age(max_age: Duration) -> Self {
		Self {
			control: CacheControlConfig::new(max_age),
			..Self::default()
		}
	}

	/// Turn on transparent ETag computation from the bytes written to the
	/// response body.
	///
	/// Idempotent: a second call is a no-op. When an ETag or Last-Modified
	/// has already been declared explicitly, auto-hashing is skipped (the
	/// explicit validator is trusted) but the finalize-time comparison still
	/// runs.
	pub fn enable_auto_negotiation(&mut self) {
		if self.validator.finalized || self.validator.auto_enabled {
			return;
		}
		self.validator.auto_enabled = true;
		if self.validator.etag.is_none() && self.validator.last_modified.is_none() {
			self.hasher = Some(EtagHasher::new());
		}
	}

	/// Write a body chunk through the context.
	///
	/// While auto-negotiation is active every chunk also feeds the digest.
	pub fn write_body(&mut self, response: &mut dyn ResponseContext, chunk: &[u8]) {
		if self.validator.finalized {
			return;
		}
		if let Some(hasher) = self.hasher.as_mut() {
			hasher.update(chunk);
		}
		response.write_body(chunk);
	}

	/// Declare an explicit ETag for this response.
	///
	/// Sets the `ETag` header, enables negotiation bookkeeping, and returns
	/// whether the request's `If-None-Match` already matches. That immediate
	/// check lets the caller skip producing a body; the authoritative
	/// header/304 emission still happens at [`finalize`](Self::finalize).
	pub fn declare_etag(
		&mut self,
		request: &dyn RequestContext,
		response: &mut dyn ResponseContext,
		etag: impl Into<String>,
	) -> bool {
		if self.validator.finalized {
			return false;
		}
		let etag = etag.into();
		response.set_header(ETAG, &etag);
		self.validator.auto_enabled = true;
		// An explicit validator replaces any in-flight auto digest.
		self.hasher = None;

		let matched = negotiation::etag_matches(Some(&etag), request.header(&IF_NONE_MATCH));
		self.validator.etag = Some(etag);
		matched
	}

	/// Declare an explicit Last-Modified timestamp for this response.
	///
	/// Sets the `Last-Modified` header, enables negotiation bookkeeping, and
	/// returns whether the resource is unchanged relative to the request's
	/// `If-Modified-Since`.
	pub fn declare_last_modified(
		&mut self,
		request: &dyn RequestContext,
		response: &mut dyn ResponseContext,
		when: DateTime<Utc>,
	) -> bool {
		if self.validator.finalized {
			return false;
		}
		// HTTP dates carry second resolution; truncate so the stored
		// validator agrees with the header the client will echo back.
		let when = when.with_nanosecond(0).unwrap_or(when);
		response.set_header(LAST_MODIFIED, &httpdate::fmt_http_date(when.into()));
		self.validator.auto_enabled = true;
		self.hasher = None;
		self.validator.last_modified = Some(when);

		negotiation::unmodified_since(Some(when), request.header(&IF_MODIFIED_SINCE))
	}

	/// Resolve the verdict and commit the response.
	///
	/// First call only; later calls are idempotent passthroughs. When the
	/// validators confirm the client's copy, the response is replaced with a
	/// `304` carrying the fixed body `"Cached"` and a Cache-Control that
	/// forces revalidation. Otherwise the accumulated body flows through
	/// untouched.
	pub fn finalize(
		&mut self,
		request: &dyn RequestContext,
		response: &mut dyn ResponseContext,
	) {
		if self.validator.finalized || response.is_finalized() {
			self.validator.finalized = true;
			return;
		}
		self.validator.finalized = true;

		if let Some(hasher) = self.hasher.take() {
			let digest = hasher.finalize();
			response.set_header(ETAG, &digest);
			self.validator.etag = Some(digest);
		}

		if negotiation::verdict(&self.validator, request) {
			debug!("validators confirm cached copy, short-circuiting as 304");
			response.set_header(CACHE_CONTROL, REVALIDATE);
			response.finalize(
				Some(StatusCode::NOT_MODIFIED),
				Some(Bytes::from_static(NOT_MODIFIED_BODY)),
			);
		} else {
			response.finalize(None, None);
		}
	}

	/// Store the max-age used for later header composition.
	pub fn set_max_age(&mut self, max_age: Duration) {
		self.control.set_max_age(max_age);
	}

	/// Write the `Cache-Control` header.
	///
	/// `age` defaults to the stored max-age, `keywords` to `["public"]`.
	pub fn compose_cache_control(
		&mut self,
		response: &mut dyn ResponseContext,
		age: Option<Duration>,
		keywords: Option<Vec<String>>,
	) {
		if self.validator.finalized {
			return;
		}
		let value = self.control.cache_control_value(age, keywords);
		response.set_header(CACHE_CONTROL, &value);
	}

	/// Write the `Expires` header, defaulting to now + stored max-age.
	pub fn set_expires(
		&mut self,
		response: &mut dyn ResponseContext,
		date: Option<DateTime<Utc>>,
	) {
		if self.validator.finalized {
			return;
		}
		let value = self.control.expires_value(date);
		response.set_header(EXPIRES, &value);
	}

	/// Current validator state.
	pub fn validator(&self) -> &Validator {
		&self.validator
	}

	/// Whether this context has already committed its response.
	pub fn is_finalized(&self) -> bool {
		self.validator.finalized
	}
}
