//! Middleware and handler traits for request processing.
//!
//! ## Handler
//!
//! The `Handler` trait is the core abstraction for processing requests:
//!
//! ```rust
//! use freshet_http::{Handler, Request, Response};
//! use async_trait::async_trait;
//!
//! struct MyHandler;
//!
//! #[async_trait]
//! impl Handler for MyHandler {
//!     async fn handle(&self, _request: Request) -> freshet_http::Result<Response> {
//!         Ok(Response::ok().with_body("Hello!"))
//!     }
//! }
//! ```
//!
//! ## Middleware
//!
//! Middleware wraps handlers to add cross-cutting concerns via composition:
//!
//! ```rust
//! use freshet_http::{Handler, Middleware, Request, Response};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct PassThrough;
//!
//! #[async_trait]
//! impl Middleware for PassThrough {
//!     async fn process(&self, request: Request, next: Arc<dyn Handler>) -> freshet_http::Result<Response> {
//!         next.handle(request).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

/// Handler trait for processing requests.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed.
	async fn handle(&self, request: Request) -> Result<Response>;
}

/// Blanket implementation so `Arc<dyn Handler>` is itself a handler.
#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Middleware trait for request/response processing.
///
/// Middleware can modify requests before passing to the next handler, or
/// modify responses after the handler processes the request.
#[async_trait]
pub trait Middleware: Send + Sync {
	/// Processes a request through this middleware.
	///
	/// # Errors
	///
	/// Returns an error if the middleware or next handler fails.
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;
}

/// Composes multiple middleware and a terminal handler into one handler.
///
/// Requests flow through middleware in the order they were added.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	/// Creates a new chain around the terminal handler.
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	/// Adds a middleware to the chain.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut current: Arc<dyn Handler> = self.handler.clone();

		for middleware in self.middlewares.iter().rev() {
			current = Arc::new(ComposedHandler {
				middleware: middleware.clone(),
				next: current,
			});
		}

		current.handle(request).await
	}
}

struct ComposedHandler {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for ComposedHandler {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	struct MockHandler {
		response_body: String,
	}

	#[async_trait]
	impl Handler for MockHandler {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok().with_body(self.response_body.clone()))
		}
	}

	struct PrefixMiddleware {
		prefix: String,
	}

	#[async_trait]
	impl Middleware for PrefixMiddleware {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			let response = next.handle(request).await?;
			let current = String::from_utf8(response.body.to_vec()).unwrap_or_default();
			Ok(Response::ok().with_body(format!("{}{}", self.prefix, current)))
		}
	}

	fn create_test_request() -> Request {
		Request::builder().uri("/").build().unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_chain_without_middleware() {
		let handler = Arc::new(MockHandler {
			response_body: "Test".to_string(),
		});
		let chain = MiddlewareChain::new(handler);

		let response = chain.handle(create_test_request()).await.unwrap();

		assert_eq!(&response.body[..], b"Test");
	}

	#[rstest]
	#[tokio::test]
	async fn test_chain_applies_middleware_in_order() {
		let handler = Arc::new(MockHandler {
			response_body: "Data".to_string(),
		});
		let chain = MiddlewareChain::new(handler)
			.with_middleware(Arc::new(PrefixMiddleware {
				prefix: "M1:".to_string(),
			}))
			.with_middleware(Arc::new(PrefixMiddleware {
				prefix: "M2:".to_string(),
			}));

		let response = chain.handle(create_test_request()).await.unwrap();

		assert_eq!(&response.body[..], b"M1:M2:Data");
	}
}
