use std::sync::Arc;

/// Callback stored in a request's extensions.
#[derive(Clone)]
pub(crate) struct OnInformational(Arc<dyn Fn(Informational<'_>) + Send + Sync>);

/// Add a callback for provisional 1xx responses.
///
/// The engine delivers every interim response (`100 Continue`,
/// `103 Early Hints`, ...) on the same stream as the final one, and the
/// transport drops them before parsing the final response. With this
/// extension set, each dropped 1xx response is parsed and handed to
/// `callback` first.
///
/// # Example
///
/// ```
/// # use curl_transport::{ext, Body, Request};
/// let mut req = Request::post("http://localhost:8080/upload")
///     .body(Body::from("hello"))
///     .unwrap();
///
/// ext::on_informational(&mut req, |res| {
///     println!("provisional: {}", res.status());
/// });
/// ```
pub fn on_informational<B, F>(req: &mut http::Request<B>, callback: F)
where
    F: Fn(Informational<'_>) + Send + Sync + 'static,
{
    req.extensions_mut()
        .insert(OnInformational(Arc::new(callback)));
}

impl OnInformational {
    pub(crate) fn call(&self, res: &http::Response<()>) {
        (self.0)(Informational(res));
    }
}

/// A provisional response that is about to be discarded.
#[derive(Debug)]
pub struct Informational<'a>(&'a http::Response<()>);

impl Informational<'_> {
    /// The status code, always in the 1xx range.
    #[inline]
    pub fn status(&self) -> http::StatusCode {
        self.0.status()
    }

    /// The HTTP version of the response.
    #[inline]
    pub fn version(&self) -> http::Version {
        self.0.version()
    }

    /// The headers of the response.
    #[inline]
    pub fn headers(&self) -> &http::HeaderMap {
        self.0.headers()
    }
}
