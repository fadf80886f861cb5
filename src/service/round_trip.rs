use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};

use crate::body::Body;
use crate::engine::Handle;
use crate::transport::Transport;

/// Sends one request and waits for its response.
pub trait RoundTrip {
    /// Execute `req`, blocking until the final response has been received.
    fn round_trip(&self, req: Request<Body>) -> crate::Result<Response<Bytes>>;
}

impl<H: Handle> RoundTrip for Transport<H> {
    fn round_trip(&self, req: Request<Body>) -> crate::Result<Response<Bytes>> {
        self.execute(req)
    }
}

impl<T: RoundTrip + ?Sized> RoundTrip for &'_ T {
    #[inline]
    fn round_trip(&self, req: Request<Body>) -> crate::Result<Response<Bytes>> {
        (**self).round_trip(req)
    }
}

impl<T: RoundTrip + ?Sized> RoundTrip for Box<T> {
    #[inline]
    fn round_trip(&self, req: Request<Body>) -> crate::Result<Response<Bytes>> {
        (**self).round_trip(req)
    }
}

impl<T: RoundTrip + ?Sized> RoundTrip for Arc<T> {
    #[inline]
    fn round_trip(&self, req: Request<Body>) -> crate::Result<Response<Bytes>> {
        (**self).round_trip(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, MockHandle};
    use crate::pool::Pool;

    fn status_of<T: RoundTrip>(transport: T) -> u16 {
        let req = Request::get("http://localhost/").body(Body::empty()).unwrap();
        transport.round_trip(req).unwrap().status().as_u16()
    }

    #[test]
    fn forwarded_through_pointers() {
        let pool = Arc::new(Pool::new());
        pool.release(MockHandle::create().respond(&[
            Event::Header(b"HTTP/1.1 202 Accepted\r\n"),
            Event::Header(b"\r\n"),
        ]));
        let transport = Transport::with_pool(pool);

        assert_eq!(status_of(&transport), 202);
        assert_eq!(status_of(Box::new(transport.clone())), 202);

        let dynamic: Arc<dyn RoundTrip + Send + Sync> = Arc::new(transport);
        assert_eq!(status_of(dynamic), 202);
    }
}
