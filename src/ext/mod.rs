//! Extensions carried on requests and responses.
//!
//! A request can ask to observe the provisional responses that are
//! otherwise discarded ([`on_informational`]), and a response records a
//! non-canonical status reason in its extensions ([`ReasonPhrase`]).

mod informational;
mod reason_phrase;

pub use informational::{on_informational, Informational};
pub(crate) use informational::OnInformational;
pub use reason_phrase::ReasonPhrase;
