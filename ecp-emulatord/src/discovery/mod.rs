//! SSDP discovery responder.
//!
//! Listens for `M-SEARCH` requests targeting `roku:ecp` (or `ssdp:all`) and
//! answers each one with a unicast advertisement after a random delay bounded
//! by the request's MX header. Multicast mode also sends periodic
//! `NOTIFY ssdp:alive` announcements to the group.

pub mod message;
pub mod request;
pub mod responder;

pub use request::{Mx, SearchRequest};
pub use responder::{DiscoveryResponder, ResponderStatus};
