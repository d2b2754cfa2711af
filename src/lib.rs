//! # Freshet
//!
//! Conditional-request validation and cache header negotiation for HTTP
//! services.
//!
//! Given an outgoing response and metadata about the resource it represents
//! (a content hash, a last-modified time, or a watched file), Freshet
//! decides whether the client's cached copy is still valid and, when it is,
//! short-circuits the response as `304 Not Modified` instead of re-sending
//! the body. It also composes the `Cache-Control` and `Expires` headers that
//! tell downstream caches how long to trust the response.
//!
//! ## Crates
//!
//! - `freshet-http`: request/response primitives and the abstract seams the
//!   core consumes ([`Request`], [`Response`], [`Handler`], [`Middleware`],
//!   [`FileSystem`])
//! - `freshet-cache`: the negotiation engine with [`CacheContext`],
//!   [`FileWatchCache`], ETag hashing and header composition
//! - `freshet-middleware`: [`ConditionalGetMiddleware`] for handler chains
//!   (enabled by the default `middleware` feature)
//!
//! ## Quick start
//!
//! ```rust
//! use freshet::{CacheContext, Request, Response, ResponseContext};
//! use hyper::StatusCode;
//! use hyper::header::IF_NONE_MATCH;
//!
//! let request = Request::builder()
//!     .uri("/report")
//!     .header(IF_NONE_MATCH, "\"v42\"")
//!     .build()
//!     .unwrap();
//! let mut response = Response::ok().with_body("the full report");
//! let mut ctx = CacheContext::new();
//!
//! if ctx.declare_etag(&request, &mut response, "\"v42\"") {
//!     // The client's copy is current; no need to build a body.
//! }
//! ctx.finalize(&request, &mut response);
//!
//! assert_eq!(response.status, StatusCode::NOT_MODIFIED);
//! assert_eq!(&response.body[..], b"Cached");
//! ```

pub use freshet_cache::{
	CacheContext, CacheControlConfig, EtagHasher, FileWatchCache, Validator, WatchError,
	WatchedFileEntry, etag_matches, metadata_etag, unmodified_since,
};
pub use freshet_http::{
	FileStat, FileSystem, Handler, HttpError, Middleware, MiddlewareChain, OsFileSystem, Request,
	RequestBuilder, RequestContext, Response, ResponseContext, Result,
};

#[cfg(feature = "middleware")]
pub use freshet_middleware::ConditionalGetMiddleware;
