//! The per-request side of a transfer: the request body being uploaded,
//! and the buffers the engine's header and body callbacks fill.

use std::io::{self, Read};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::{Bytes, BytesMut};

use super::parse;
use crate::body::Body;
use crate::engine::Callbacks;
use crate::ext::OnInformational;

/// Every response the engine reports starts with this.
const STATUS_LINE_PREFIX: &[u8] = b"HTTP/1.";

pub(super) struct Exchange<'a> {
    payload: Option<Mutex<Body>>,
    buffers: Mutex<Buffers>,
    failure: Mutex<Option<crate::Error>>,
    on_informational: Option<&'a OnInformational>,
}

#[derive(Default)]
struct Buffers {
    head: BytesMut,
    body: BytesMut,
    /// The blank line ending the current head has been seen.
    head_complete: bool,
}

impl<'a> Exchange<'a> {
    pub(super) fn new(body: Body, on_informational: Option<&'a OnInformational>) -> Exchange<'a> {
        let payload = if body.is_empty() {
            None
        } else {
            Some(Mutex::new(body))
        };
        Exchange {
            payload,
            buffers: Mutex::new(Buffers::default()),
            failure: Mutex::new(None),
            on_informational,
        }
    }

    /// The last response's head followed by its body, or the first error a
    /// callback recorded.
    pub(super) fn into_message(self) -> crate::Result<Bytes> {
        if let Some(err) = into_inner(self.failure) {
            debug!("callback failed during transfer: {}", err);
            return Err(err);
        }
        let Buffers { mut head, body, .. } = into_inner(self.buffers);
        head.unsplit(body);
        Ok(head.freeze())
    }

    fn fail(&self, err: crate::Error) {
        let mut failure = lock(&self.failure);
        if failure.is_none() {
            *failure = Some(err);
        }
    }
}

impl Callbacks for Exchange<'_> {
    fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    fn read_payload(&self, buf: &mut [u8]) -> usize {
        let Some(ref payload) = self.payload else {
            return 0;
        };
        let mut body = lock(payload);
        loop {
            match body.read(buf) {
                Ok(n) => return n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    // The engine only understands byte counts; end the
                    // upload here and surface the error after perform.
                    self.fail(crate::Error::new_user_body(e));
                    return 0;
                }
            }
        }
    }

    fn write_body(&self, data: &[u8]) {
        lock(&self.buffers).body.extend_from_slice(data);
    }

    fn write_header(&self, data: &[u8]) {
        let mut provisional = Vec::new();
        {
            let mut buffers = lock(&self.buffers);
            for line in lines(data) {
                if line.starts_with(STATUS_LINE_PREFIX) {
                    // A new response on the same stream. Whatever came
                    // before it was provisional.
                    if !buffers.head.is_empty() {
                        trace!("discarding {} bytes of a previous response", buffers.head.len() + buffers.body.len());
                        if self.on_informational.is_some() {
                            provisional.extend(parse::informational(&buffers.head));
                        }
                    }
                    buffers.head.clear();
                    buffers.body.clear();
                    buffers.head_complete = false;
                } else if buffers.head_complete {
                    // Trailers arrive after the body has started; they
                    // would split the head from the body.
                    trace!("ignoring trailer line");
                    continue;
                }

                buffers.head.extend_from_slice(line);
                buffers.head.extend_from_slice(b"\r\n");
                if line.is_empty() {
                    buffers.head_complete = true;
                }
            }
        }

        if let Some(callback) = self.on_informational {
            for res in &provisional {
                callback.call(res);
            }
        }
    }
}

/// Split a header chunk into lines, dropping the line terminators.
fn lines(chunk: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = chunk.strip_suffix(b"\n").unwrap_or(chunk);
    let mut pieces = (!chunk.is_empty()).then(|| body.split(|&b| b == b'\n'));
    std::iter::from_fn(move || pieces.as_mut()?.next())
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn into_inner<T>(mutex: Mutex<T>) -> T {
    mutex.into_inner().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn feed(exchange: &Exchange<'_>, head: &[&[u8]], body: &[u8]) {
        for line in head {
            exchange.write_header(line);
        }
        exchange.write_body(body);
    }

    #[test]
    fn lines_match_header_chunks() {
        let split = |chunk: &'static [u8]| lines(chunk).collect::<Vec<_>>();
        assert_eq!(split(b"HTTP/1.1 200 OK\r\n"), [b"HTTP/1.1 200 OK".as_slice()]);
        assert_eq!(split(b"\r\n"), [b"".as_slice()]);
        assert_eq!(split(b"a: 1\r\nb: 2"), [b"a: 1".as_slice(), b"b: 2"]);
        assert!(split(b"").is_empty());
    }

    #[test]
    fn single_response_is_kept_whole() {
        let exchange = Exchange::new(Body::empty(), None);
        feed(
            &exchange,
            &[b"HTTP/1.1 200 OK\r\n", b"Content-Length: 4\r\n", b"\r\n"],
            b"nice",
        );
        let message = exchange.into_message().unwrap();
        assert_eq!(
            &message[..],
            b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nnice"
        );
    }

    #[test]
    fn new_status_line_discards_everything_before_it() {
        let exchange = Exchange::new(Body::empty(), None);
        feed(&exchange, &[b"HTTP/1.1 100 Continue\r\n", b"\r\n"], b"stray");
        feed(
            &exchange,
            &[b"HTTP/1.1 200 OK\r\n", b"Content-Length: 4\r\n", b"\r\n"],
            b"cool",
        );

        let message = exchange.into_message().unwrap();
        assert_eq!(
            &message[..],
            b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\ncool"
        );
    }

    #[test]
    fn multiline_chunks_are_split_before_matching() {
        let exchange = Exchange::new(Body::empty(), None);
        exchange.write_header(b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 204 No Content\r\n\r\n");
        let message = exchange.into_message().unwrap();
        assert_eq!(&message[..], b"HTTP/1.1 204 No Content\r\n\r\n");
    }

    #[test]
    fn trailers_do_not_split_head_from_body() {
        let exchange = Exchange::new(Body::empty(), None);
        feed(
            &exchange,
            &[b"HTTP/1.1 200 OK\r\n", b"Transfer-Encoding: chunked\r\n", b"\r\n"],
            b"abc",
        );
        exchange.write_header(b"Checksum: 1234\r\n");
        let message = exchange.into_message().unwrap();
        assert_eq!(
            &message[..],
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nabc"
        );
    }

    #[test]
    fn provisional_responses_reach_the_callback() {
        let seen = Arc::new(AtomicUsize::new(0));
        let mut req = http::Request::new(());
        let counter = seen.clone();
        crate::ext::on_informational(&mut req, move |res| {
            assert_eq!(res.status(), http::StatusCode::CONTINUE);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let exchange = Exchange::new(Body::empty(), req.extensions().get::<OnInformational>());
        feed(&exchange, &[b"HTTP/1.1 100 Continue\r\n", b"\r\n"], b"");
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        feed(&exchange, &[b"HTTP/1.1 200 OK\r\n", b"\r\n"], b"");
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn payload_is_read_on_demand() {
        let exchange = Exchange::new(Body::from("hello world"), None);
        assert!(exchange.has_payload());

        let mut uploaded = Vec::new();
        let mut buf = [0u8; 3];
        loop {
            let n = exchange.read_payload(&mut buf);
            if n == 0 {
                break;
            }
            uploaded.extend_from_slice(&buf[..n]);
        }
        assert_eq!(uploaded, b"hello world");
        assert!(exchange.into_message().is_ok());
    }

    #[test]
    fn empty_body_registers_no_payload() {
        let exchange = Exchange::new(Body::empty(), None);
        assert!(!exchange.has_payload());
        assert_eq!(exchange.read_payload(&mut [0u8; 8]), 0);
    }

    #[test]
    fn read_errors_end_the_upload_and_are_reported() {
        struct Broken;

        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let exchange = Exchange::new(Body::from_reader(Broken), None);
        assert_eq!(exchange.read_payload(&mut [0u8; 8]), 0);
        feed(&exchange, &[b"HTTP/1.1 200 OK\r\n", b"\r\n"], b"");

        let err = exchange.into_message().unwrap_err();
        assert!(err.is_body());
    }
}
