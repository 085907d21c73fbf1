use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use shared::protocol::{SSDP_MULTICAST_ADDR, SSDP_PORT};
use crate::config::DiscoveryConfig;
use crate::device::Device;
use crate::error::EmulatorError;
use super::message;
use super::request::SearchRequest;

const RECV_BUFFER_SIZE: usize = 8192;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderStatus {
    Idle,
    Listening,
}

enum ResponderState {
    Idle,
    Listening(Listening),
}

struct Listening {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    /// (group, interface) when the multicast group was joined
    membership: Option<(Ipv4Addr, Ipv4Addr)>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Answers SSDP searches for the emulated device with a delayed unicast
/// advertisement.
pub struct DiscoveryResponder {
    device: Arc<Device>,
    host_ip: IpAddr,
    config: DiscoveryConfig,
    state: ResponderState,
}

impl DiscoveryResponder {
    pub fn new(device: Arc<Device>, host_ip: IpAddr, config: DiscoveryConfig) -> Self {
        Self {
            device,
            host_ip,
            config,
            state: ResponderState::Idle,
        }
    }

    pub fn status(&self) -> ResponderStatus {
        match self.state {
            ResponderState::Idle => ResponderStatus::Idle,
            ResponderState::Listening(_) => ResponderStatus::Listening,
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            ResponderState::Idle => None,
            ResponderState::Listening(listening) => Some(listening.local_addr),
        }
    }

    /// Bind the socket, join the multicast group and spawn the receive loop.
    /// On failure the responder stays `Idle` and no socket is left open.
    pub async fn start(&mut self, parent: &CancellationToken) -> Result<SocketAddr, EmulatorError> {
        if matches!(self.state, ResponderState::Listening(_)) {
            return Err(EmulatorError::AlreadyRunning("discovery responder"));
        }

        let (std_socket, membership) = bind_socket(self.host_ip, &self.config)?;
        let bind_addr = std_socket.local_addr().ok();
        let socket = UdpSocket::from_std(std_socket).map_err(|source| EmulatorError::DiscoveryBind {
            addr: bind_addr.unwrap_or_else(|| SocketAddr::new(self.host_ip, self.config.port)),
            source,
        })?;
        let local_addr = socket.local_addr().map_err(|source| EmulatorError::DiscoveryBind {
            addr: SocketAddr::new(self.host_ip, self.config.port),
            source,
        })?;

        let socket = Arc::new(socket);
        let cancel = parent.child_token();
        let mut tasks = Vec::new();

        tasks.push(tokio::spawn(run_listener(
            socket.clone(),
            self.device.clone(),
            cancel.clone(),
        )));

        if membership.is_some() && self.config.notify_interval_secs > 0 {
            tasks.push(tokio::spawn(run_notifier(
                socket.clone(),
                self.device.clone(),
                Duration::from_secs(self.config.notify_interval_secs),
                self.config.port,
                cancel.clone(),
            )));
        }

        tracing::info!(
            "Discovery listening on {} (multicast: {}, usn: {})",
            local_addr,
            membership.is_some(),
            self.device.usn()
        );

        self.state = ResponderState::Listening(Listening {
            socket,
            local_addr,
            membership,
            cancel,
            tasks,
        });

        Ok(local_addr)
    }

    /// Stop the loops and drop group membership. Replies still waiting out
    /// their delay are abandoned.
    pub async fn stop(&mut self) {
        let ResponderState::Listening(listening) =
            std::mem::replace(&mut self.state, ResponderState::Idle)
        else {
            return;
        };

        listening.cancel.cancel();

        if let Some((group, interface)) = listening.membership {
            if let Err(e) = listening.socket.leave_multicast_v4(group, interface) {
                tracing::warn!("Failed to leave multicast group {}: {}", group, e);
            }
        }

        for task in listening.tasks {
            let _ = task.await;
        }

        tracing::info!("Discovery on {} stopped", listening.local_addr);
    }
}

/// Multicast mode binds the wildcard address and joins the SSDP group on the
/// host interface. Otherwise the socket is bound to the host address only.
fn bind_socket(
    host_ip: IpAddr,
    config: &DiscoveryConfig,
) -> Result<(std::net::UdpSocket, Option<(Ipv4Addr, Ipv4Addr)>), EmulatorError> {
    let bind_addr = if config.bind_multicast {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.port)
    } else {
        SocketAddr::new(host_ip, config.port)
    };
    let bind_err = |source| EmulatorError::DiscoveryBind { addr: bind_addr, source };

    let socket = Socket::new(Domain::for_address(bind_addr), Type::DGRAM, Some(Protocol::UDP))
        .map_err(bind_err)?;
    socket.set_reuse_address(true).map_err(bind_err)?;
    #[cfg(unix)]
    socket.set_reuse_port(true).map_err(bind_err)?;
    socket.bind(&bind_addr.into()).map_err(bind_err)?;
    socket.set_nonblocking(true).map_err(bind_err)?;

    let socket: std::net::UdpSocket = socket.into();

    if !config.bind_multicast {
        return Ok((socket, None));
    }

    let group: Ipv4Addr = SSDP_MULTICAST_ADDR
        .parse()
        .unwrap_or(Ipv4Addr::new(239, 255, 255, 250));
    let interface = match host_ip {
        IpAddr::V4(ip) => ip,
        IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
    };

    // `socket` is dropped on the error path, closing it before we return
    socket
        .join_multicast_v4(&group, &interface)
        .map_err(|source| EmulatorError::JoinMulticast { group, interface, source })?;

    tracing::debug!("Joined {} on {}", group, interface);
    Ok((socket, Some((group, interface))))
}

async fn run_listener(socket: Arc<UdpSocket>, device: Arc<Device>, cancel: CancellationToken) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, src)) => handle_datagram(&socket, &device, &buf[..len], src, &cancel),
                    Err(e) => {
                        tracing::warn!("Discovery receive error: {}", e);
                    }
                }
            }
            _ = cancel.cancelled() => {
                tracing::debug!("Discovery listener shutting down");
                break;
            }
        }
    }
}

/// Schedule a reply for one datagram. Anything that is not a search for this
/// device is dropped without a reply.
fn handle_datagram(
    socket: &Arc<UdpSocket>,
    device: &Arc<Device>,
    data: &[u8],
    src: SocketAddr,
    cancel: &CancellationToken,
) {
    let Ok(text) = std::str::from_utf8(data) else {
        tracing::debug!("Dropping non UTF-8 datagram from {}", src);
        return;
    };

    let Some(request) = SearchRequest::parse(text) else {
        tracing::trace!("Dropping unparseable datagram from {}", src);
        return;
    };

    if !request.is_ecp_search() {
        return;
    }

    let delay = request.mx.reply_delay();
    tracing::debug!(
        "Search from {} (ST={}, MX={:?}), replying in {:?}",
        src,
        request.target,
        request.mx,
        delay
    );

    let socket = socket.clone();
    let device = device.clone();
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = cancel.cancelled() => return,
        }

        let reply = message::search_reply(&device.identity);
        match socket.send_to(reply.as_bytes(), src).await {
            Ok(_) => tracing::debug!("Search reply sent to {}", src),
            Err(e) => tracing::warn!("Failed to send search reply to {}: {}", src, e),
        }
    });
}

async fn run_notifier(
    socket: Arc<UdpSocket>,
    device: Arc<Device>,
    period: Duration,
    port: u16,
    cancel: CancellationToken,
) {
    let group = SocketAddr::new(
        SSDP_MULTICAST_ADDR
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(239, 255, 255, 250))),
        if port == 0 { SSDP_PORT } else { port },
    );
    let notify = message::notify_alive(&device.identity);
    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match socket.send_to(notify.as_bytes(), group).await {
                    Ok(_) => tracing::debug!("NOTIFY alive sent to {}", group),
                    Err(e) => tracing::warn!("Failed to send NOTIFY alive: {}", e),
                }
            }
            _ = cancel.cancelled() => break,
        }
    }
}
