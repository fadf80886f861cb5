#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(rust_2018_idioms))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # curl-transport
//!
//! An HTTP/1 transport that sends [`http`] requests through libcurl.
//!
//! Requests and responses are the plain types of the [`http`] crate, so the
//! transport drops in wherever a client lets its transport be swapped out.
//! Underneath, each request borrows a curl easy handle from a shared
//! [`Pool`], configures it, and streams the request body out and the
//! response back in through curl's callbacks.
//!
//! ```no_run
//! use curl_transport::{Body, Request, Transport};
//!
//! # fn main() -> curl_transport::Result<()> {
//! let transport = Transport::new();
//!
//! let res = transport.execute(Request::get("http://localhost:3000/").body(Body::empty()).unwrap())?;
//! assert!(res.status().is_success());
//! # Ok(())
//! # }
//! ```
//!
//! ## Handles
//!
//! Creating a curl handle is expensive, and a handle keeps its connection
//! cache alive between transfers, so handles are pooled. A [`Pool`] never
//! lends the same handle twice at once, resets every handle before taking
//! it back, and cleans up every handle it stops holding, whether it was
//! evicted or the pool itself was dropped. See the [`pool`] module.
//!
//! ## Provisional responses
//!
//! curl reports every response of a transfer on the same stream,
//! including `100 Continue` and other 1xx responses that precede the final
//! one. Only the last response is returned; earlier ones can be observed
//! with [`ext::on_informational`].
//!
//! # Optional Features
//!
//! - `runtime`: Enables [`service::Blocking`], an asynchronous service that
//!   runs transfers on tokio's blocking thread pool.
//! - `tracing`: Emits diagnostics through the `tracing` crate.
//!
//! Setting the `CURL_DEBUG` environment variable to `1` turns on curl's own
//! verbose output for every request.

#[doc(hidden)]
pub use http;

pub use bytes::Bytes;
pub use http::{header, HeaderMap, Method, Request, Response, StatusCode, Uri, Version};

pub use crate::body::Body;
pub use crate::error::{Error, Result};
pub use crate::pool::Pool;
pub use crate::transport::Transport;

#[macro_use]
mod cfg;

#[macro_use]
mod trace;

pub mod body;
pub mod engine;
mod error;
pub mod ext;
mod headers;
pub mod pool;
pub mod service;
pub mod transport;

#[cfg(test)]
mod mock;
