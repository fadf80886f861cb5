use http::header::{HeaderMap, HeaderValue, ValueIter, CONTENT_LENGTH};

use crate::Error;

/// Render a header map as the engine's list of `Name: value` lines.
///
/// Repeated values of one name are folded into a single line, joined with
/// `,`. A positive `content_length` becomes an explicit `Content-Length`
/// line and replaces any such header already in the map.
///
/// The engine takes header lines as text, so a value that is not UTF-8 is
/// an error rather than being rewritten.
pub(crate) fn outgoing(
    headers: &HeaderMap,
    content_length: Option<u64>,
) -> crate::Result<Vec<String>> {
    let explicit_length = content_length.filter(|&len| len > 0);

    let mut lines = Vec::with_capacity(headers.keys_len() + 1);
    for name in headers.keys() {
        if explicit_length.is_some() && name == CONTENT_LENGTH {
            continue;
        }
        let joined = headers
            .get_all(name)
            .iter()
            .map(|value| value.to_str().map_err(Error::new_user_header))
            .collect::<crate::Result<Vec<_>>>()?
            .join(",");
        lines.push(format!("{}: {}", name.as_str(), joined));
    }

    if let Some(len) = explicit_length {
        let mut buf = itoa::Buffer::new();
        lines.push(format!("Content-Length: {}", buf.format(len)));
    }
    Ok(lines)
}

pub(crate) fn content_length_parse_all(headers: &HeaderMap) -> Option<u64> {
    content_length_parse_all_values(headers.get_all(CONTENT_LENGTH).into_iter())
}

fn content_length_parse_all_values(values: ValueIter<'_, HeaderValue>) -> Option<u64> {
    // If multiple Content-Length headers were sent, everything can still
    // be alright if they all contain the same value, and all parse
    // correctly. If not, then it's an error.

    let mut content_length: Option<u64> = None;
    for h in values {
        if let Ok(line) = h.to_str() {
            for v in line.split(',') {
                if let Some(n) = from_digits(v.trim().as_bytes()) {
                    if content_length.is_none() {
                        content_length = Some(n)
                    } else if content_length != Some(n) {
                        return None;
                    }
                } else {
                    return None;
                }
            }
        } else {
            return None;
        }
    }

    content_length
}

fn from_digits(bytes: &[u8]) -> Option<u64> {
    // cannot use FromStr for u64, since it allows a signed prefix
    let mut result = 0u64;
    const RADIX: u64 = 10;

    if bytes.is_empty() {
        return None;
    }

    for &b in bytes {
        match b {
            b'0'..=b'9' => {
                result = result.checked_mul(RADIX)?;
                result = result.checked_add((b - b'0') as u64)?;
            }
            _ => {
                // not a DIGIT, get outta here!
                return None;
            }
        }
    }

    Some(result)
}
