//! The native transfer engine, seen from the transport.
//!
//! The transport never talks to libcurl directly. It speaks to a [`Handle`]:
//! something that can be created, configured one [`Opt`] at a time, asked
//! to perform a single blocking transfer while feeding [`Callbacks`], and
//! reset for the next request. The production implementation is
//! [`curl::easy::Easy`]; tests substitute a scripted handle.

use std::error::Error as StdError;
use std::sync::Once;

mod easy;

/// A reusable native transfer session.
///
/// Creating a handle is expensive, which is why they are pooled. A handle
/// is never shared: one request owns it from checkout until it is reset
/// and released again.
pub trait Handle: Send + Sized + 'static {
    /// The engine's own error type.
    type Error: StdError + Send + Sync + 'static;

    /// Create a fresh handle.
    ///
    /// Creation itself cannot report failure; a broken handle surfaces
    /// when the first option is applied to it.
    fn create() -> Self;

    /// Apply one option to the handle.
    fn set_option(&mut self, option: Opt) -> Result<(), Self::Error>;

    /// Run one transfer to completion.
    ///
    /// Blocks until the whole exchange, including any provisional
    /// responses, has finished or failed. The read callback is only
    /// registered when [`Callbacks::has_payload`] is true.
    fn perform(&mut self, callbacks: &dyn Callbacks) -> Result<(), Self::Error>;

    /// Return the handle to its freshly created state, keeping any live
    /// connections and caches.
    fn reset(&mut self);

    /// Release the native resources of the handle.
    ///
    /// The default drops the handle.
    fn cleanup(self) {
        drop(self)
    }
}

/// The streaming side of one transfer.
///
/// Callbacks may be invoked from threads internal to the engine, so every
/// method takes `&self` and implementations guard their own state.
pub trait Callbacks: Sync {
    /// Whether the request has a body to upload.
    fn has_payload(&self) -> bool;

    /// Fill `buf` with the next chunk of the request body.
    ///
    /// Returns the number of bytes written; `0` ends the upload.
    fn read_payload(&self, buf: &mut [u8]) -> usize;

    /// Receive a chunk of response body.
    fn write_body(&self, data: &[u8]);

    /// Receive a chunk of response head.
    fn write_header(&self, data: &[u8]);
}

/// An option applied to a [`Handle`] before performing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Opt {
    /// The target URL, verbatim.
    Url(String),
    /// Start a new cookie session, ignoring session cookies from before.
    CookieSession(bool),
    /// Verbose engine logging.
    Verbose(bool),
    /// Maximum number of redirects.
    MaxRedirections(u32),
    /// Replace the request method.
    CustomRequest(String),
    /// Perform a POST.
    Post(bool),
    /// The size of a POST body.
    PostFieldSize(u64),
    /// Do not expect a response body.
    NoBody(bool),
    /// Send the request body through the read callback, whatever the
    /// method.
    Upload(bool),
    /// The size of an uploaded body.
    InFileSize(u64),
    /// Disable Nagle's algorithm.
    TcpNoDelay(bool),
    /// The HTTP version to speak.
    HttpVersion(HttpVersion),
    /// Extra request header lines, `Name: value`.
    HttpHeaders(Vec<String>),
}

/// HTTP versions the engine can be asked to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1
    Http11,
}

/// Initialize the engine's process-wide state.
///
/// Idempotent and thread-safe; called before the first handle is created.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        ::curl::init();
        debug!("curl {} initialized", ::curl::Version::get().version());
    });
}
