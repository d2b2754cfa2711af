//! # Freshet HTTP
//!
//! Request/response primitives and the abstract seams the Freshet cache core
//! builds on:
//!
//! - [`Request`] and [`Response`]: concrete in-memory HTTP messages
//! - [`RequestContext`] and [`ResponseContext`]: the header/body/status
//!   capabilities the negotiation engine consumes
//! - [`Handler`], [`Middleware`] and [`MiddlewareChain`]: the processing
//!   pipeline seam
//! - [`FileSystem`] and [`OsFileSystem`]: stat/exists access for the
//!   watched-file cache

pub mod error;
pub mod fs;
pub mod middleware;
pub mod request;
pub mod response;

pub use error::{HttpError, Result};
pub use fs::{FileStat, FileSystem, OsFileSystem};
pub use middleware::{Handler, Middleware, MiddlewareChain};
pub use request::{Request, RequestBuilder, RequestContext};
pub use response::{Response, ResponseContext};
