use std::error::Error as StdError;
use std::fmt;
use std::future::Future;
use std::panic;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;

use super::{RoundTrip, Service};
use crate::body::Body;
use crate::Error;

type ResponseFuture = Pin<Box<dyn Future<Output = crate::Result<Response<Bytes>>> + Send>>;

/// Runs a blocking [`RoundTrip`] as an asynchronous [`Service`].
///
/// Each call collects the request body, then performs the transfer on
/// tokio's blocking thread pool, so it must be called from within a tokio
/// runtime.
///
/// ```no_run
/// use curl_transport::service::{Blocking, Service};
/// use curl_transport::{Request, Transport};
/// use http_body_util::Full;
///
/// # async fn run() -> curl_transport::Result<()> {
/// let client = Blocking::new(Transport::new());
/// let req = Request::get("http://localhost:3000/")
///     .body(Full::new(curl_transport::Bytes::new()))
///     .unwrap();
/// let res = client.call(req).await?;
/// println!("{}", res.status());
/// # Ok(())
/// # }
/// ```
pub struct Blocking<T> {
    inner: Arc<T>,
}

impl<T> Blocking<T> {
    /// Wrap a blocking transport.
    pub fn new(inner: T) -> Blocking<T> {
        Blocking {
            inner: Arc::new(inner),
        }
    }

    /// A reference to the wrapped transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }
}

impl<T, B> Service<Request<B>> for Blocking<T>
where
    T: RoundTrip + Send + Sync + 'static,
    B: http_body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ResponseFuture;

    fn call(&self, req: Request<B>) -> Self::Future {
        let inner = self.inner.clone();
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body
                .collect()
                .await
                .map_err(Error::new_user_body)?
                .to_bytes();
            let req = Request::from_parts(parts, Body::from(body));

            match tokio::task::spawn_blocking(move || inner.round_trip(req)).await {
                Ok(res) => res,
                Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
                Err(_) => {
                    debug!("blocking transfer was cancelled");
                    Err(Error::new_canceled())
                }
            }
        })
    }
}

impl<T> Clone for Blocking<T> {
    fn clone(&self) -> Blocking<T> {
        Blocking {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Blocking<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Blocking").field(&self.inner).finish()
    }
}
