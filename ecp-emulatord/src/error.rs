use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

/// Startup failures. Each one leaves the affected engine stopped with no
/// socket held.
#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("failed to bind discovery socket on {addr}")]
    DiscoveryBind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to join multicast group {group} on interface {interface}")]
    JoinMulticast {
        group: Ipv4Addr,
        interface: Ipv4Addr,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind control listener on {addr}")]
    Listen {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("{0} is already running")]
    AlreadyRunning(&'static str),
}
