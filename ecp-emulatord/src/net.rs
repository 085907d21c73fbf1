use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs, UdpSocket};

/// Best guess at the LAN address other devices can reach us on.
///
/// Tries the source address the kernel would pick for an outbound route
/// (no packet is sent), then the address the hostname resolves to, then
/// loopback.
pub fn local_ip() -> IpAddr {
    if let Some(ip) = outbound_ip() {
        return ip;
    }

    if let Some(ip) = hostname_ip() {
        return ip;
    }

    tracing::warn!("Could not detect local address, falling back to loopback");
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn outbound_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(10, 255, 255, 255), 1)).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

fn hostname_ip() -> Option<IpAddr> {
    let hostname = hostname::get().ok()?;
    let hostname = hostname.to_str()?;
    (hostname, 0)
        .to_socket_addrs()
        .ok()?
        .map(|addr| addr.ip())
        .find(|ip| ip.is_ipv4() && !ip.is_unspecified())
}

/// Addresses we accept control requests from: loopback, RFC 1918 private,
/// link-local and IPv6 unique-local.
pub fn is_local_peer(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ip) => ip.is_loopback() || ip.is_private() || ip.is_link_local(),
        IpAddr::V6(ip) => {
            if let Some(mapped) = ip.to_ipv4_mapped() {
                return is_local_peer(IpAddr::V4(mapped));
            }
            let first = ip.segments()[0];
            ip.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
    }
}
