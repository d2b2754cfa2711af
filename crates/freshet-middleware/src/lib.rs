//! Middleware integration for the Freshet conditional-caching core.

pub mod conditional;

pub use conditional::ConditionalGetMiddleware;
