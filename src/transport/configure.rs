use std::env;

use http::{Method, Request, Version};

use crate::body::Body;
use crate::engine::{Handle, HttpVersion, Opt};
use crate::Error;

/// Redirects followed before the engine gives up.
pub(super) const MAX_REDIRECTIONS: u32 = 20;

/// Set to `1` to turn on the engine's verbose output.
pub(super) const VERBOSE_ENV: &str = "CURL_DEBUG";

/// Apply the options derived from `req` to `handle`.
///
/// Every option is derived before the first one is applied, so a request
/// the engine cannot speak leaves the handle untouched. The first option
/// the engine refuses aborts configuration.
pub(super) fn configure<H: Handle>(handle: &mut H, req: &Request<Body>) -> crate::Result<()> {
    for option in options(req)? {
        trace!("set option {:?}", option);
        handle.set_option(option).map_err(Error::new_option)?;
    }
    Ok(())
}

/// The options for `req`, in the order they are applied.
pub(super) fn options(req: &Request<Body>) -> crate::Result<Vec<Opt>> {
    let (major, minor) = version_numbers(req.version());
    let version = http_version(major, minor)?;

    let mut options = vec![
        Opt::Url(req.uri().to_string()),
        Opt::CookieSession(true),
        Opt::Verbose(verbose()),
        Opt::MaxRedirections(MAX_REDIRECTIONS),
    ];

    let method = req.method();
    if method == Method::POST {
        options.push(Opt::Post(true));
        // Without a size the engine falls back to a chunked upload.
        if let Some(len) = req.body().content_length() {
            options.push(Opt::PostFieldSize(len));
        }
    } else if method == Method::HEAD {
        options.push(Opt::CustomRequest(method.as_str().to_owned()));
        options.push(Opt::NoBody(true));
    } else {
        let upload = !req.body().is_empty();
        // The upload flag alone would turn the request into a PUT.
        if method != Method::GET || upload {
            options.push(Opt::CustomRequest(method.as_str().to_ascii_uppercase()));
        }
        // Only POST reads the body on its own.
        if upload {
            options.push(Opt::Upload(true));
            if let Some(len) = req.body().content_length() {
                options.push(Opt::InFileSize(len));
            }
        }
    }

    options.push(Opt::TcpNoDelay(true));
    options.push(Opt::HttpVersion(version));
    Ok(options)
}

/// Map a protocol version to the engine's.
pub(super) fn http_version(major: u8, minor: u8) -> crate::Result<HttpVersion> {
    if major != 1 {
        return Err(Error::new_unsupported_version());
    }
    match minor {
        0 => Ok(HttpVersion::Http10),
        1 => Ok(HttpVersion::Http11),
        _ => Err(Error::new_unknown_minor_version()),
    }
}

fn version_numbers(version: Version) -> (u8, u8) {
    match version {
        Version::HTTP_09 => (0, 9),
        Version::HTTP_10 => (1, 0),
        Version::HTTP_11 => (1, 1),
        Version::HTTP_2 => (2, 0),
        Version::HTTP_3 => (3, 0),
        _ => (0, 0),
    }
}

fn verbose() -> bool {
    env::var_os(VERBOSE_ENV).map_or(false, |value| value == "1")
}
