//! End-to-end conditional GET flow through a middleware chain.

use async_trait::async_trait;
use freshet_http::{Handler, MiddlewareChain, Request, Response};
use freshet_middleware::ConditionalGetMiddleware;
use hyper::StatusCode;
use hyper::header::{ETAG, IF_NONE_MATCH};
use std::sync::Arc;

struct PageHandler;

#[async_trait]
impl Handler for PageHandler {
	async fn handle(&self, _request: Request) -> freshet_http::Result<Response> {
		Ok(Response::ok().with_body("<html>page</html>"))
	}
}

#[tokio::test]
async fn test_revalidation_round_trip_through_chain() {
	let chain = MiddlewareChain::new(Arc::new(PageHandler))
		.with_middleware(Arc::new(ConditionalGetMiddleware::new()));

	// First request: full body plus a generated validator.
	let first = Request::builder().uri("/page").build().unwrap();
	let response = chain.handle(first).await.unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(&response.body[..], b"<html>page</html>");
	let etag = response
		.headers
		.get(ETAG)
		.and_then(|v| v.to_str().ok())
		.expect("generated etag")
		.to_string();

	// Second request echoes the validator and is short-circuited.
	let second = Request::builder()
		.uri("/page")
		.header(IF_NONE_MATCH, &etag)
		.build()
		.unwrap();
	let response = chain.handle(second).await.unwrap();

	assert_eq!(response.status, StatusCode::NOT_MODIFIED);
	assert_eq!(&response.body[..], b"Cached");
	assert_eq!(
		response.headers.get(ETAG).and_then(|v| v.to_str().ok()),
		Some(etag.as_str())
	);
}

#[tokio::test]
async fn test_mismatched_validator_serves_full_body() {
	let chain = MiddlewareChain::new(Arc::new(PageHandler))
		.with_middleware(Arc::new(ConditionalGetMiddleware::new()));

	let request = Request::builder()
		.uri("/page")
		.header(IF_NONE_MATCH, "\"some-other-version\"")
		.build()
		.unwrap();
	let response = chain.handle(request).await.unwrap();

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(&response.body[..], b"<html>page</html>");
}
