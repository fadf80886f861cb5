//! Turning the bytes collected during a transfer back into a response.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::response::Parts;
use http::{Method, Response, StatusCode, Version};
use httparse::ParserConfig;

use crate::error::Parse;
use crate::ext::ReasonPhrase;
use crate::headers;
use crate::Error;

/// Headers accepted in a single response head.
const MAX_HEADERS: usize = 100;

/// Parse a complete message, head then body, into a response.
pub(super) fn response(message: Bytes, method: &Method) -> crate::Result<Response<Bytes>> {
    let (parts, head_len) = parse_head(&message)?;
    let body = message.slice(head_len..);
    let body = body_for(&parts, method, body)?;
    trace!("parsed response: {} with {} body bytes", parts.status, body.len());
    Ok(Response::from_parts(parts, body))
}

/// Parse the head of a provisional response, if it is one.
pub(super) fn informational(head: &[u8]) -> Option<Response<()>> {
    match parse_head(head) {
        Ok((parts, _)) if parts.status.is_informational() => Some(Response::from_parts(parts, ())),
        Ok((_parts, _)) => {
            debug!("discarded a non-informational response: {}", _parts.status);
            None
        }
        Err(_e) => {
            debug!("discarded an unparsable response head: {}", _e);
            None
        }
    }
}

/// Parse a response head, returning its parts and length in bytes.
fn parse_head(buf: &[u8]) -> crate::Result<(Parts, usize)> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut res = httparse::Response::new(&mut headers);

    let mut config = ParserConfig::default();
    config
        .allow_spaces_after_header_name_in_responses(true)
        .allow_obsolete_multiline_headers_in_responses(true);

    let len = match config.parse_response(&mut res, buf).map_err(Parse::from)? {
        httparse::Status::Complete(len) => len,
        httparse::Status::Partial => return Err(Error::new_incomplete()),
    };

    let (mut parts, ()) = Response::new(()).into_parts();
    parts.version = if res.version == Some(0) {
        Version::HTTP_10
    } else {
        Version::HTTP_11
    };
    parts.status = StatusCode::from_u16(res.code.unwrap_or(0)).map_err(Parse::from)?;

    if let Some(reason) = res.reason {
        if parts.status.canonical_reason() != Some(reason) {
            parts.extensions.insert(ReasonPhrase::from_bytes_unchecked(
                Bytes::copy_from_slice(reason.as_bytes()),
            ));
        }
    }

    let mut map = HeaderMap::with_capacity(res.headers.len());
    for header in res.headers.iter() {
        let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(Parse::from)?;
        let value = header_value(header.value).map_err(Parse::from)?;
        map.append(name, value);
    }
    parts.headers = map;

    Ok((parts, len))
}

/// Build a header value, unfolding obsolete line folding into spaces.
fn header_value(bytes: &[u8]) -> Result<HeaderValue, http::header::InvalidHeaderValue> {
    if !bytes.iter().any(|&b| b == b'\r' || b == b'\n') {
        return HeaderValue::from_bytes(bytes);
    }
    let unfolded: Vec<u8> = bytes
        .iter()
        .map(|&b| if b == b'\r' || b == b'\n' { b' ' } else { b })
        .collect();
    HeaderValue::from_bytes(&unfolded)
}

/// Apply the message framing rules to the bytes that followed the head.
fn body_for(parts: &Parts, method: &Method, body: Bytes) -> crate::Result<Bytes> {
    if method == Method::HEAD
        || parts.status.is_informational()
        || parts.status == StatusCode::NO_CONTENT
        || parts.status == StatusCode::NOT_MODIFIED
    {
        return Ok(Bytes::new());
    }

    // The engine has already removed any transfer coding.
    if parts.headers.contains_key(TRANSFER_ENCODING) {
        return Ok(body);
    }

    if !parts.headers.contains_key(CONTENT_LENGTH) {
        return Ok(body);
    }

    let len = headers::content_length_parse_all(&parts.headers)
        .ok_or_else(Parse::content_length_invalid)?;
    match usize::try_from(len) {
        Ok(len) if len <= body.len() => Ok(body.slice(..len)),
        _ => {
            debug!("body has {} bytes, content-length is {}", body.len(), len);
            Err(Error::new_incomplete())
        }
    }
}
