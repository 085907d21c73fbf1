use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use crate::net;

/// Rejects requests that do not come from the local network or that name a
/// host other than the emulated device (DNS rebinding).
#[derive(Debug, Clone)]
pub struct RequestGuard {
    allowed_hosts: HashSet<String>,
    /// Bound to the wildcard address: any IP literal is a valid Host
    any_ip_host: bool,
}

impl RequestGuard {
    pub fn new(host_ip: IpAddr, listen_port: u16, advertise_ip: IpAddr, advertise_port: u16) -> Self {
        let mut allowed_hosts = HashSet::new();
        for ip in [host_ip, advertise_ip] {
            let host = match ip {
                IpAddr::V4(ip) => ip.to_string(),
                IpAddr::V6(ip) => format!("[{}]", ip),
            };
            for port in [listen_port, advertise_port] {
                allowed_hosts.insert(format!("{}:{}", host, port));
            }
            allowed_hosts.insert(host);
        }

        Self {
            allowed_hosts,
            any_ip_host: host_ip.is_unspecified(),
        }
    }

    pub fn allows_host(&self, host: &str) -> bool {
        let host = host.trim().to_ascii_lowercase();
        if self.allowed_hosts.contains(&host) {
            return true;
        }
        self.any_ip_host && host_ip(&host).is_some()
    }

    pub fn allows_peer(&self, peer: IpAddr) -> bool {
        net::is_local_peer(peer)
    }
}

/// IP literal named by a Host header value, with or without a port
fn host_ip(host: &str) -> Option<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(ip);
    }
    if let Ok(addr) = host.parse::<SocketAddr>() {
        return Some(addr.ip());
    }
    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return inner.parse().ok();
    }
    None
}

pub async fn check_remote_and_host(
    State(guard): State<Arc<RequestGuard>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = connect_info.map(|ConnectInfo(addr)| addr.ip());

    match peer {
        Some(ip) if guard.allows_peer(ip) => {}
        _ => {
            tracing::warn!("Rejected request from non-local peer {:?}", peer);
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());

    match host {
        Some(host) if guard.allows_host(host) => next.run(request).await,
        _ => {
            tracing::warn!("Rejected request with Host {:?}", host);
            StatusCode::FORBIDDEN.into_response()
        }
    }
}
