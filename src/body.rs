//! Request bodies.
//!
//! A [`Body`] is what a request uploads. The engine pulls it through the
//! read callback one buffer at a time, so a body is either nothing, a
//! chunk of bytes already in memory, or any [`std::io::Read`] source.

use std::fmt;
use std::io::{self, Read};

use bytes::{Buf, Bytes};

/// The body of an outgoing request.
///
/// In-memory bodies know their length and announce it with an explicit
/// `Content-Length` header. Streamed bodies only do so when built with
/// [`Body::sized_reader`].
pub struct Body {
    kind: Kind,
}

enum Kind {
    Empty,
    Full(Bytes),
    Reader {
        reader: Box<dyn Read + Send>,
        length: Option<u64>,
    },
}

impl Body {
    /// Create a body that sends nothing.
    pub const fn empty() -> Body {
        Body { kind: Kind::Empty }
    }

    /// Stream a body from a reader whose length is not known up front.
    pub fn from_reader<R>(reader: R) -> Body
    where
        R: Read + Send + 'static,
    {
        Body {
            kind: Kind::Reader {
                reader: Box::new(reader),
                length: None,
            },
        }
    }

    /// Stream a body of `length` bytes from a reader.
    pub fn sized_reader<R>(reader: R, length: u64) -> Body
    where
        R: Read + Send + 'static,
    {
        Body {
            kind: Kind::Reader {
                reader: Box::new(reader),
                length: Some(length),
            },
        }
    }

    /// Returns true if there is nothing to upload.
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::Empty)
    }

    /// The number of bytes this body declares, if known.
    pub fn content_length(&self) -> Option<u64> {
        match self.kind {
            Kind::Empty => Some(0),
            Kind::Full(ref bytes) => Some(bytes.len() as u64),
            Kind::Reader { length, .. } => length,
        }
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.kind {
            Kind::Empty => Ok(0),
            Kind::Full(ref mut bytes) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                bytes.advance(n);
                Ok(n)
            }
            Kind::Reader { ref mut reader, .. } => reader.read(buf),
        }
    }
}

impl Default for Body {
    fn default() -> Body {
        Body::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("Body");
        match self.kind {
            Kind::Empty => builder.field("kind", &"empty"),
            Kind::Full(ref bytes) => builder.field("full", &bytes.len()),
            Kind::Reader { length, .. } => builder.field("reader", &length),
        };
        builder.finish()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Body {
        if bytes.is_empty() {
            Body::empty()
        } else {
            Body {
                kind: Kind::Full(bytes),
            }
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(vec: Vec<u8>) -> Body {
        Body::from(Bytes::from(vec))
    }
}

impl From<&'static [u8]> for Body {
    fn from(slice: &'static [u8]) -> Body {
        Body::from(Bytes::from_static(slice))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Body {
        Body::from(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Body {
        Body::from(Bytes::from_static(s.as_bytes()))
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Body {
        Body::empty()
    }
}
