//! Error and Result module.
use std::error::Error as StdError;
use std::fmt;

/// Result type often returned from methods that can have curl-transport `Error`s.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) type Cause = Box<dyn StdError + Send + Sync>;

/// Represents errors that can occur while executing a request.
///
/// # Formatting
///
/// The `Display` implementation of this type prints a short description
/// of what went wrong. Failures reported by the native engine while
/// performing a transfer are appended verbatim, since they carry the only
/// useful detail (`Couldn't connect to server`, TLS failures, and so on).
/// Every other cause is only reachable through `Error::source()`.
///
/// # Source
///
/// An `Error` may be caused by another error: the engine's own error type,
/// an `io::Error` from a request body, or whatever a post-configure hook
/// returned. These are exposed type-erased through `Error::source()`.
pub struct Error {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    kind: Kind,
    cause: Option<Cause>,
}

#[derive(Debug)]
pub(super) enum Kind {
    /// The request asked for something the engine cannot be configured for.
    Config(Config),
    /// The engine refused an option.
    Option,
    /// The transport was built without a handle pool.
    PoolUnavailable,
    /// The engine failed to perform the transfer.
    Perform,
    Parse(Parse),
    /// The body ended before the declared `Content-Length`.
    IncompleteMessage,
    /// The blocking task running the transfer was cancelled.
    #[cfg(feature = "runtime")]
    Canceled,
    User(User),
}

#[derive(Debug)]
pub(super) enum Config {
    UnsupportedVersion,
    UnknownMinorVersion,
}

#[derive(Debug)]
pub(super) enum Parse {
    Version,
    Header(Header),
    TooLarge,
    Status,
}

#[derive(Debug)]
pub(super) enum Header {
    Token,
    ContentLengthInvalid,
}

#[derive(Debug)]
pub(super) enum User {
    /// Error reading from the request body.
    Body,
    /// The post-configure hook returned an error.
    PostConfigure,
    /// A request header value the engine cannot send.
    Header,
}

impl Error {
    /// Returns true if the request used a protocol version other than HTTP/1.0 or HTTP/1.1.
    pub fn is_unsupported_version(&self) -> bool {
        matches!(self.inner.kind, Kind::Config(_))
    }

    /// Returns true if the engine rejected a transfer option.
    pub fn is_option(&self) -> bool {
        matches!(self.inner.kind, Kind::Option)
    }

    /// Returns true if the transport has no handle pool to draw from.
    pub fn is_pool_unavailable(&self) -> bool {
        matches!(self.inner.kind, Kind::PoolUnavailable)
    }

    /// Returns true if the engine failed to perform the transfer.
    ///
    /// Connection refused, DNS and TLS failures all land here.
    pub fn is_perform(&self) -> bool {
        matches!(self.inner.kind, Kind::Perform)
    }

    /// Returns true if the received bytes could not be parsed as a response.
    pub fn is_parse(&self) -> bool {
        matches!(self.inner.kind, Kind::Parse(_))
    }

    /// Returns true if the error was caused by an invalid status line.
    pub fn is_parse_status(&self) -> bool {
        matches!(self.inner.kind, Kind::Parse(Parse::Status))
    }

    /// Returns true if the response body was shorter than its declared length.
    pub fn is_incomplete_message(&self) -> bool {
        matches!(self.inner.kind, Kind::IncompleteMessage)
    }

    /// Returns true if the transfer was cancelled before it completed.
    pub fn is_canceled(&self) -> bool {
        #[cfg(feature = "runtime")]
        {
            if matches!(self.inner.kind, Kind::Canceled) {
                return true;
            }
        }
        false
    }

    /// Returns true if this error was caused by user code.
    pub fn is_user(&self) -> bool {
        matches!(self.inner.kind, Kind::User(_))
    }

    /// Returns true if reading the request body failed.
    pub fn is_body(&self) -> bool {
        matches!(self.inner.kind, Kind::User(User::Body))
    }

    /// Returns true if the post-configure hook failed.
    pub fn is_post_configure(&self) -> bool {
        matches!(self.inner.kind, Kind::User(User::PostConfigure))
    }

    pub(super) fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(ErrorImpl { kind, cause: None }),
        }
    }

    pub(super) fn with<C: Into<Cause>>(mut self, cause: C) -> Error {
        self.inner.cause = Some(cause.into());
        self
    }

    pub(super) fn new_unsupported_version() -> Error {
        Error::new(Kind::Config(Config::UnsupportedVersion))
    }

    pub(super) fn new_unknown_minor_version() -> Error {
        Error::new(Kind::Config(Config::UnknownMinorVersion))
    }

    pub(super) fn new_option<E: Into<Cause>>(cause: E) -> Error {
        Error::new(Kind::Option).with(cause)
    }

    pub(super) fn new_pool_unavailable() -> Error {
        Error::new(Kind::PoolUnavailable)
    }

    pub(super) fn new_perform<E: Into<Cause>>(cause: E) -> Error {
        Error::new(Kind::Perform).with(cause)
    }

    pub(super) fn new_incomplete() -> Error {
        Error::new(Kind::IncompleteMessage)
    }

    #[cfg(feature = "runtime")]
    pub(super) fn new_canceled() -> Error {
        Error::new(Kind::Canceled)
    }

    fn new_user(user: User) -> Error {
        Error::new(Kind::User(user))
    }

    pub(super) fn new_user_body<E: Into<Cause>>(cause: E) -> Error {
        Error::new_user(User::Body).with(cause)
    }

    pub(super) fn new_user_post_configure<E: Into<Cause>>(cause: E) -> Error {
        Error::new_user(User::PostConfigure).with(cause)
    }

    pub(super) fn new_user_header<E: Into<Cause>>(cause: E) -> Error {
        Error::new_user(User::Header).with(cause)
    }

    fn description(&self) -> &str {
        match self.inner.kind {
            Kind::Config(Config::UnsupportedVersion) => "only HTTP/1.x is supported",
            Kind::Config(Config::UnknownMinorVersion) => "unknown minor HTTP version",
            Kind::Option => "failed to set a transfer option",
            Kind::PoolUnavailable => "transport handle pool is not initialized",
            Kind::Perform => "transfer failed",
            Kind::Parse(Parse::Version) => "invalid HTTP version parsed",
            Kind::Parse(Parse::Header(Header::Token)) => "invalid HTTP header parsed",
            Kind::Parse(Parse::Header(Header::ContentLengthInvalid)) => {
                "invalid content-length parsed"
            }
            Kind::Parse(Parse::TooLarge) => "message head is too large",
            Kind::Parse(Parse::Status) => "invalid HTTP status-code parsed",
            Kind::IncompleteMessage => "transfer ended before message completed",
            #[cfg(feature = "runtime")]
            Kind::Canceled => "operation was canceled",
            Kind::User(User::Body) => "error from user's request body",
            Kind::User(User::PostConfigure) => "error from user's post-configure hook",
            Kind::User(User::Header) => "header value is not valid UTF-8",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_tuple("curl_transport::Error");
        f.field(&self.inner.kind);
        if let Some(ref cause) = self.inner.cause {
            f.field(cause);
        }
        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())?;
        match (&self.inner.kind, &self.inner.cause) {
            (Kind::Perform, Some(cause)) => write!(f, ": {}", cause),
            _ => Ok(()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .cause
            .as_ref()
            .map(|cause| &**cause as &(dyn StdError + 'static))
    }
}

#[doc(hidden)]
impl From<Parse> for Error {
    fn from(err: Parse) -> Error {
        Error::new(Kind::Parse(err))
    }
}

impl Parse {
    pub(crate) fn content_length_invalid() -> Self {
        Parse::Header(Header::ContentLengthInvalid)
    }
}

impl From<httparse::Error> for Parse {
    fn from(err: httparse::Error) -> Parse {
        match err {
            httparse::Error::HeaderName
            | httparse::Error::HeaderValue
            | httparse::Error::NewLine
            | httparse::Error::Token => Parse::Header(Header::Token),
            httparse::Error::Status => Parse::Status,
            httparse::Error::TooManyHeaders => Parse::TooLarge,
            httparse::Error::Version => Parse::Version,
        }
    }
}

impl From<http::status::InvalidStatusCode> for Parse {
    fn from(_: http::status::InvalidStatusCode) -> Parse {
        Parse::Status
    }
}

impl From<http::header::InvalidHeaderName> for Parse {
    fn from(_: http::header::InvalidHeaderName) -> Parse {
        Parse::Header(Header::Token)
    }
}

impl From<http::header::InvalidHeaderValue> for Parse {
    fn from(_: http::header::InvalidHeaderValue) -> Parse {
        Parse::Header(Header::Token)
    }
}
