#![crate_name = "hyper_staticroute"]
#![deny(missing_docs)]

//! Request routing with a static file fallback, for [Hyper 1.0](https://github.com/hyperium/hyper).
//!
//! This library composes a request pipeline out of three parts: a `Router` matching method and
//! path to handlers, a `Chain` of middleware in front of it, and `FileMiddleware`, which serves
//! files from a public directory when no route matches and answers byte-range requests
//! directly.
//!
//! ## Basic usage
//!
//! ```rust
//! use hyper_staticroute::{json, App, Chain, FileConfig, FileMiddleware, Request, RequestExt, Router};
//!
//! let mut router = Router::new();
//! router.get("/hello/:name", |req: Request| async move {
//!     let name = req.params().get("name").unwrap_or("stranger").to_owned();
//!     json(&format!("hello, {name}"))
//! });
//!
//! let chain = Chain::new(router).with(FileMiddleware::new(FileConfig::new("my/public/root/")));
//!
//! // `App` implements `hyper::service::Service`, and can be handed to a hyper connection.
//! let app = App::new(chain);
//! ```
//!
//! Requests are handled in this order:
//!
//! 1. `GET`/`HEAD` requests with a `Range: bytes=<start>-<end>` header are answered from the
//!    file with `206 Partial Content`, bypassing the router. Other range forms are ignored.
//! 2. Everything else is dispatched to the router.
//! 3. If no route matches a `GET`/`HEAD` request, the path is looked up under the public
//!    directory. The file is served with validators, and `304 Not Modified` when the client
//!    copy is current. A missing file results in `404`.
//!
//! Paths trying to escape the public directory with `..` are answered with `403` at any
//! point.
//!
//! ## Advanced usage
//!
//! The building blocks are public. `resolve` maps a request path onto the public directory,
//! `serve_range` and `FileResponseBuilder` turn the resulting `FileResource` into partial or
//! full responses, and `cache::evaluate` decides between a full and a not-modified response.
//! Custom middleware implements `Middleware` and calls `Next::run` to continue the chain.

pub mod cache;
mod chain;
mod codec;
mod config;
mod error;
mod file_middleware;
pub mod range;
mod resolve;
mod router;
mod service;
mod util;

pub use crate::chain::*;
pub use crate::codec::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::file_middleware::*;
pub use crate::range::{parse_range, serve_range, RangeSpec};
pub use crate::resolve::*;
pub use crate::router::*;
pub use crate::service::*;
pub use crate::util::{Body, FileBytesStream, FileBytesStreamRange, FileResponseBuilder, RequestedPath};

/// A request whose body has been collected.
pub type Request = http::Request<hyper::body::Bytes>;

/// A response produced by the chain.
pub type Response = http::Response<Body>;
