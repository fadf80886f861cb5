//! Executing requests through pooled engine handles.
//!
//! A [`Transport`] takes an [`http::Request`], checks a handle out of its
//! [`Pool`], configures the handle from the request, runs the transfer and
//! parses what the engine streamed back into an [`http::Response`]. The
//! handle goes back to the pool, reset, on every exit path.
//!
//! ```no_run
//! use curl_transport::{Body, Request, Transport};
//!
//! # fn main() -> curl_transport::Result<()> {
//! let transport = Transport::new();
//! let req = Request::post("http://localhost:3000/echo")
//!     .body(Body::from("hello world"))
//!     .unwrap();
//!
//! let res = transport.execute(req)?;
//! println!("{}: {:?}", res.status(), res.body());
//! # Ok(())
//! # }
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use curl::easy::Easy;
use http::header::CONTENT_LENGTH;
use http::{Method, Request, Response};

use self::exchange::Exchange;
use crate::body::Body;
use crate::engine::{Handle, Opt};
use crate::ext::OnInformational;
use crate::headers;
use crate::pool::Pool;
use crate::Error;

mod configure;
mod exchange;
mod parse;

type BoxError = Box<dyn StdError + Send + Sync>;

/// A hook run on every handle after the transport has configured it and
/// before the transfer starts.
///
/// Use it for engine options the transport does not set itself, such as
/// authentication schemes or TLS settings.
pub type PostConfigure<H> = dyn Fn(&mut H, &Request<Body>) -> Result<(), BoxError> + Send + Sync;

/// An HTTP/1 transport backed by pooled engine handles.
///
/// `Transport` is cheap to clone; clones share the same pool and hook.
pub struct Transport<H: Handle = Easy> {
    pool: Option<Arc<Pool<H>>>,
    post_configure: Option<Arc<PostConfigure<H>>>,
}

/// A builder to configure a [`Transport`].
pub struct Builder<H: Handle = Easy> {
    pool: Option<Arc<Pool<H>>>,
    post_configure: Option<Arc<PostConfigure<H>>>,
}

// ===== impl Transport =====

impl Transport {
    /// Create a transport with its own unbounded pool of curl handles.
    pub fn new() -> Transport {
        Transport::with_pool(Arc::new(Pool::new()))
    }

    /// Create a builder to configure a new transport.
    pub fn builder() -> Builder {
        Builder::new()
    }
}

impl<H: Handle> Transport<H> {
    /// Create a transport drawing handles from `pool`.
    pub fn with_pool(pool: Arc<Pool<H>>) -> Transport<H> {
        Transport {
            pool: Some(pool),
            post_configure: None,
        }
    }

    /// The pool this transport draws handles from.
    pub fn pool(&self) -> Option<&Arc<Pool<H>>> {
        self.pool.as_ref()
    }

    /// Send a request and wait for the complete response.
    ///
    /// Blocks the calling thread for the whole transfer. Provisional 1xx
    /// responses are dropped; the returned response is the final one.
    /// A HEAD request is sent without its body.
    ///
    /// # Errors
    ///
    /// Fails if the transport has no pool, the request asks for anything
    /// but HTTP/1.0 or HTTP/1.1, a header value is not UTF-8, the engine
    /// refuses an option or the post-configure hook fails. After the transfer, an engine failure
    /// is reported first, then any error reading the request body, then
    /// any problem parsing the response.
    pub fn execute(&self, mut req: Request<Body>) -> crate::Result<Response<Bytes>> {
        let _span = debug_span!("execute", method = %req.method(), uri = %req.uri());

        let pool = self.pool.as_ref().ok_or_else(Error::new_pool_unavailable)?;

        if req.method() == Method::HEAD && !req.body().is_empty() {
            debug!("dropping the body of a HEAD request");
            *req.body_mut() = Body::empty();
            req.headers_mut().remove(CONTENT_LENGTH);
        }

        let mut handle = pool.checkout();

        configure::configure(&mut *handle, &req)?;

        let lines = headers::outgoing(req.headers(), req.body().content_length())?;
        handle
            .set_option(Opt::HttpHeaders(lines))
            .map_err(Error::new_option)?;

        if let Some(ref hook) = self.post_configure {
            hook(&mut *handle, &req).map_err(|e| {
                debug!("post-configure hook failed: {}", e);
                Error::new_user_post_configure(e)
            })?;
        }

        let (parts, body) = req.into_parts();
        let exchange = Exchange::new(body, parts.extensions.get::<OnInformational>());

        if let Err(e) = handle.perform(&exchange) {
            debug!("transfer failed: {}", e);
            return Err(Error::new_perform(e));
        }

        let message = exchange.into_message()?;
        parse::response(message, &parts.method)
    }
}

impl<H: Handle> Clone for Transport<H> {
    fn clone(&self) -> Transport<H> {
        Transport {
            pool: self.pool.clone(),
            post_configure: self.post_configure.clone(),
        }
    }
}

impl Default for Transport {
    fn default() -> Transport {
        Transport::new()
    }
}

impl<H: Handle> fmt::Debug for Transport<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("pool", &self.pool)
            .field("post_configure", &self.post_configure.is_some())
            .finish()
    }
}

// ===== impl Builder =====

impl<H: Handle> Builder<H> {
    /// Create a builder with no pool and no hook.
    ///
    /// A transport built without a pool fails every request; set one with
    /// [`Builder::pool`].
    pub fn new() -> Builder<H> {
        Builder {
            pool: None,
            post_configure: None,
        }
    }

    /// Sets the pool handles are drawn from.
    ///
    /// Pools can be shared between transports.
    pub fn pool(&mut self, pool: Arc<Pool<H>>) -> &mut Builder<H> {
        self.pool = Some(pool);
        self
    }

    /// Sets a hook to run on each handle after it has been configured for
    /// a request, right before the transfer.
    ///
    /// An error from the hook fails the request, and the handle is still
    /// returned to the pool.
    ///
    /// # Example
    ///
    /// ```
    /// # use std::sync::Arc;
    /// use curl::easy::{Auth, Easy};
    /// use curl_transport::{Pool, Transport};
    ///
    /// let transport = Transport::builder()
    ///     .pool(Arc::new(Pool::new()))
    ///     .post_configure(|handle: &mut Easy, _req: &_| {
    ///         let mut auth = Auth::new();
    ///         auth.ntlm(true);
    ///         handle.http_auth(&auth)
    ///     })
    ///     .build();
    /// # drop(transport);
    /// ```
    pub fn post_configure<F, E>(&mut self, hook: F) -> &mut Builder<H>
    where
        F: Fn(&mut H, &Request<Body>) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.post_configure = Some(Arc::new(move |handle: &mut H, req: &Request<Body>| {
            hook(handle, req).map_err(Into::into)
        }));
        self
    }

    /// Build a transport with this configuration.
    pub fn build(&self) -> Transport<H> {
        Transport {
            pool: self.pool.clone(),
            post_configure: self.post_configure.clone(),
        }
    }
}

impl<H: Handle> Default for Builder<H> {
    fn default() -> Builder<H> {
        Builder::new()
    }
}

impl<H: Handle> fmt::Debug for Builder<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("pool", &self.pool)
            .field("post_configure", &self.post_configure.is_some())
            .finish()
    }
}
