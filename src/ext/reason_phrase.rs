use bytes::Bytes;

/// The reason phrase of a response whose status line did not use the
/// canonical one.
///
/// Responses with `200 OK` carry no extension; a server answering
/// `200 Alright` yields a response with `ReasonPhrase("Alright")` in its
/// extensions.
///
/// ```no_run
/// # use curl_transport::{ext::ReasonPhrase, Body, Request, Transport};
/// # fn main() -> curl_transport::Result<()> {
/// let transport = Transport::new();
/// let res = transport.execute(Request::get("http://localhost/").body(Body::empty()).unwrap())?;
/// if let Some(reason) = res.extensions().get::<ReasonPhrase>() {
///     println!("{}", String::from_utf8_lossy(reason.as_bytes()));
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReasonPhrase(Bytes);

impl ReasonPhrase {
    /// Gets the reason phrase as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Wraps a phrase that the response parser already validated.
    pub(crate) fn from_bytes_unchecked(reason: Bytes) -> Self {
        Self(reason)
    }
}

impl From<ReasonPhrase> for Bytes {
    fn from(reason: ReasonPhrase) -> Self {
        reason.0
    }
}

impl AsRef<[u8]> for ReasonPhrase {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
