//! # Freshet Cache
//!
//! The conditional-caching core: given an outgoing response and metadata
//! about the resource it represents, decide whether the client's cached copy
//! is still valid and, if so, short-circuit the response as `304 Not
//! Modified` instead of re-sending the body.
//!
//! ## Components
//!
//! - [`etag`]: streaming body digests and file-metadata ETags
//! - [`negotiation`]: `If-None-Match` / `If-Modified-Since` decision logic
//! - [`context`]: [`CacheContext`], the per-request validator registry and
//!   auto-negotiation decorator over the response seam
//! - [`control`]: `Cache-Control` / `Expires` composition
//! - [`watch`]: [`FileWatchCache`], the process-wide watched-file registry
//!   with TTL-based staleness and re-stat policy
//!
//! ## Quick start
//!
//! ```rust
//! use freshet_cache::CacheContext;
//! use freshet_http::{Request, Response, ResponseContext};
//!
//! let request = Request::builder().uri("/report").build().unwrap();
//! let mut response = Response::ok();
//! let mut ctx = CacheContext::new();
//!
//! // Hash the body transparently and negotiate at finalize time.
//! ctx.enable_auto_negotiation();
//! ctx.write_body(&mut response, b"report body");
//! ctx.finalize(&request, &mut response);
//!
//! assert!(response.header(&hyper::header::ETAG).is_some());
//! ```

pub mod context;
pub mod control;
pub mod error;
pub mod etag;
pub mod negotiation;
pub mod watch;

pub use context::CacheContext;
pub use control::CacheControlConfig;
pub use error::WatchError;
pub use etag::{EtagHasher, metadata_etag};
pub use negotiation::{Validator, etag_matches, unmodified_since};
pub use watch::{FileWatchCache, WatchedFileEntry};
