//! Plugging the transport in where a client expects one.
//!
//! [`RoundTrip`] is the single operation a client needs from its
//! transport: given a request, return a response or an error. Anything
//! written against `RoundTrip` works with a [`Transport`](crate::Transport)
//! or a reference, `Box` or `Arc` of one.
//!
//! With the `runtime` feature, [`Blocking`] wraps any `RoundTrip` in an
//! asynchronous [`Service`], running each transfer on tokio's blocking
//! thread pool.

mod round_trip;

pub use self::round_trip::RoundTrip;

cfg_runtime! {
    mod blocking;
    mod service;

    pub use self::blocking::Blocking;
    pub use self::service::Service;
}
