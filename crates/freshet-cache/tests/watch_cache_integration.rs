//! Watched-file cache tests against the real filesystem.

use freshet_cache::{CacheContext, FileWatchCache};
use freshet_http::{Request, Response, ResponseContext};
use hyper::StatusCode;
use hyper::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use rstest::rstest;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn plain_request() -> Request {
	Request::builder().uri("/static/f").build().unwrap()
}

/// Request whose conditional headers echo the cached entry's validators,
/// the way a client that saw the previous response would.
fn revalidating_request(cache: &FileWatchCache, path: &std::path::Path) -> Request {
	let entry = cache.entry(path).expect("watched entry");
	let last_modified = httpdate::fmt_http_date(entry.modified_at);

	Request::builder()
		.uri("/static/f")
		.header(IF_NONE_MATCH, &entry.etag)
		.header(IF_MODIFIED_SINCE, &last_modified)
		.build()
		.unwrap()
}

#[rstest]
fn test_unwatched_path_is_always_changed() {
	let cache = FileWatchCache::new(Duration::from_secs(60));
	let mut ctx = CacheContext::new();
	let request = plain_request();
	let mut response = Response::ok();

	assert!(cache.is_changed("/tmp/missing", false, &mut ctx, &request, &mut response));
}

#[rstest]
fn test_matching_client_headers_report_unchanged() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("page.html");
	fs::write(&path, "<html></html>").unwrap();

	let cache = FileWatchCache::new(Duration::from_secs(60));
	cache.watch(&path).unwrap();

	let request = revalidating_request(&cache, &path);
	let mut ctx = CacheContext::new();
	let mut response = Response::ok();

	let changed = cache.is_changed(&path, false, &mut ctx, &request, &mut response);

	assert!(!changed);
	// Both validators were declared onto the response for this request.
	assert!(response.header(&ETAG).is_some());
	assert!(response.header(&LAST_MODIFIED).is_some());
}

#[rstest]
fn test_stale_client_etag_reports_changed() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("page.html");
	fs::write(&path, "<html></html>").unwrap();

	let cache = FileWatchCache::new(Duration::from_secs(60));
	let entry = cache.watch(&path).unwrap();

	let request = Request::builder()
		.uri("/static/f")
		.header(IF_NONE_MATCH, "\"stale-digest\"")
		.header(
			IF_MODIFIED_SINCE,
			&httpdate::fmt_http_date(entry.modified_at),
		)
		.build()
		.unwrap();
	let mut ctx = CacheContext::new();
	let mut response = Response::ok();

	// Last-Modified agrees but the digest does not: both must agree for
	// an unchanged verdict.
	assert!(cache.is_changed(&path, false, &mut ctx, &request, &mut response));
}

#[rstest]
fn test_force_triggers_restat_and_fresh_digest() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("data.json");
	fs::write(&path, "{}").unwrap();

	let cache = FileWatchCache::new(Duration::from_secs(3600));
	cache.watch(&path).unwrap();
	let before = cache.entry(&path).unwrap();

	// Rewrite with new content and a later mtime.
	std::thread::sleep(Duration::from_millis(20));
	fs::write(&path, "{\"updated\":true}").unwrap();

	let request = plain_request();
	let mut ctx = CacheContext::new();
	let mut response = Response::ok();
	cache.is_changed(&path, true, &mut ctx, &request, &mut response);

	let after = cache.entry(&path).unwrap();
	assert_ne!(before.etag, after.etag);
	assert!(after.modified_at > before.modified_at);
	assert!(after.expires_at > before.expires_at);
	assert!(after.created_at >= before.created_at);
}

#[rstest]
fn test_expired_entry_refresh_extends_horizon() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("log.txt");
	fs::write(&path, "v1").unwrap();

	// Zero max-age: every entry is immediately past its horizon.
	let cache = FileWatchCache::new(Duration::ZERO);
	cache.watch(&path).unwrap();
	let before = cache.entry(&path).unwrap();

	std::thread::sleep(Duration::from_millis(20));
	fs::write(&path, "v2 with more bytes").unwrap();

	let request = plain_request();
	let mut ctx = CacheContext::new();
	let mut response = Response::ok();
	cache.is_changed(&path, false, &mut ctx, &request, &mut response);

	let after = cache.entry(&path).unwrap();
	assert!(after.expires_at > before.expires_at);
	assert_ne!(before.etag, after.etag);
}

#[rstest]
fn test_watch_then_revalidate_round_trip() {
	let dir = TempDir::new().unwrap();
	let path = dir.path().join("styles.css");
	fs::write(&path, "body { color: red; }").unwrap();

	let cache = FileWatchCache::new(Duration::from_secs(60));
	cache.watch(&path).unwrap();

	// First request: no conditional headers, body is served with validators.
	let request = plain_request();
	let mut ctx = CacheContext::new();
	let mut response = Response::ok();
	let changed = cache.is_changed(&path, false, &mut ctx, &request, &mut response);
	assert!(changed);
	ctx.write_body(&mut response, b"body { color: red; }");
	ctx.finalize(&request, &mut response);
	assert_eq!(response.status, StatusCode::OK);

	// Second request echoes the validators back and gets the short-circuit.
	let etag = response.header(&ETAG).unwrap().to_string();
	let last_modified = response.header(&LAST_MODIFIED).unwrap().to_string();
	let revalidation = Request::builder()
		.uri("/static/f")
		.header(IF_NONE_MATCH, &etag)
		.header(IF_MODIFIED_SINCE, &last_modified)
		.build()
		.unwrap();

	let mut ctx = CacheContext::new();
	let mut response = Response::ok();
	let changed = cache.is_changed(&path, false, &mut ctx, &revalidation, &mut response);
	assert!(!changed);
	ctx.finalize(&revalidation, &mut response);

	assert_eq!(response.status, StatusCode::NOT_MODIFIED);
	assert_eq!(&response.body[..], b"Cached");
}
