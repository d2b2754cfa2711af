//! `Cache-Control` and `Expires` value composition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Downstream cache policy for one response.
///
/// Stores the configured max-age until header composition; composing never
/// happens implicitly, the handler decides when the headers are written.
///
/// # Examples
///
/// ```
/// use freshet_cache::CacheControlConfig;
/// use std::time::Duration;
///
/// let config = CacheControlConfig::new(Duration::from_secs(3600));
/// let value = config.cache_control_value(None, None);
/// assert_eq!(value, "public, max-age=3600");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheControlConfig {
	max_age: Duration,
}

impl CacheControlConfig {
	/// Create a config with the given max-age.
	pub fn new(max_age: Duration) -> Self {
		Self { max_age }
	}

	/// Replace the stored max-age.
	pub fn set_max_age(&mut self, max_age: Duration) {
		self.max_age = max_age;
	}

	/// The stored max-age.
	pub fn max_age(&self) -> Duration {
		self.max_age
	}

	/// Compose a `Cache-Control` header value.
	///
	/// `age` defaults to the stored max-age and `keywords` to `["public"]`.
	/// The keyword list is taken by value: `max-age=<secs>` is appended to it
	/// before joining.
	pub fn cache_control_value(
		&self,
		age: Option<Duration>,
		keywords: Option<Vec<String>>,
	) -> String {
		let age = age.unwrap_or(self.max_age);
		let mut keywords = keywords.unwrap_or_else(|| vec!["public".to_string()]);
		keywords.push(format!("max-age={}", age.as_secs()));
		keywords.join(", ")
	}

	/// Compose an `Expires` header value, defaulting to now + stored max-age.
	///
	/// Advisory for clients and intermediate caches only; the negotiation
	/// engine never consults it.
	pub fn expires_value(&self, date: Option<DateTime<Utc>>) -> String {
		let date = date.unwrap_or_else(|| Utc::now() + self.max_age);
		httpdate::fmt_http_date(date.into())
	}
}

impl Default for CacheControlConfig {
	fn default() -> Self {
		Self::new(Duration::ZERO)
	}
}
