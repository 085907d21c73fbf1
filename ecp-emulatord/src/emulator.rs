use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use crate::api::{self, AppState, RequestGuard};
use crate::config::Config;
use crate::device::Device;
use crate::discovery::DiscoveryResponder;
use crate::error::EmulatorError;
use crate::handler::CommandHandler;

/// How long `stop` waits for in-flight control requests before abandoning them
pub(crate) const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

struct ApiServer {
    local_addr: SocketAddr,
    task: JoinHandle<()>,
}

/// The emulated device: discovery responder plus ECP control server, sharing
/// one read-only [`Device`]. Owned by the host, which drives `start`/`stop`.
pub struct EcpEmulator {
    config: Config,
    device: Arc<Device>,
    handler: Arc<dyn CommandHandler>,
    discovery: DiscoveryResponder,
    api: Option<ApiServer>,
    cancel: CancellationToken,
}

impl EcpEmulator {
    pub fn new(config: Config, handler: Arc<dyn CommandHandler>) -> Self {
        let device = Arc::new(Device::from_config(&config));
        Self::with_device(config, device, handler)
    }

    pub fn with_device(config: Config, device: Arc<Device>, handler: Arc<dyn CommandHandler>) -> Self {
        let discovery = DiscoveryResponder::new(
            device.clone(),
            config.api.host_ip,
            config.discovery.clone(),
        );

        Self {
            config,
            device,
            handler,
            discovery,
            api: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }

    pub fn is_running(&self) -> bool {
        self.api.is_some()
    }

    pub fn discovery_addr(&self) -> Option<SocketAddr> {
        self.discovery.local_addr()
    }

    pub fn api_addr(&self) -> Option<SocketAddr> {
        self.api.as_ref().map(|api| api.local_addr)
    }

    /// Bring up discovery, then the control listener. If the listener cannot
    /// be bound, discovery is torn down again before the error is returned.
    pub async fn start(&mut self) -> Result<(), EmulatorError> {
        if self.api.is_some() {
            return Err(EmulatorError::AlreadyRunning("emulator"));
        }

        self.cancel = CancellationToken::new();
        self.discovery.start(&self.cancel).await?;

        let listen_addr = SocketAddr::new(self.config.api.host_ip, self.config.api.listen_port);
        let listener = match TcpListener::bind(listen_addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.discovery.stop().await;
                return Err(EmulatorError::Listen { addr: listen_addr, source });
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(source) => {
                drop(listener);
                self.discovery.stop().await;
                return Err(EmulatorError::Listen { addr: listen_addr, source });
            }
        };

        let guard = RequestGuard::new(
            self.config.api.host_ip,
            local_addr.port(),
            self.device.identity.advertise_ip,
            self.device.identity.advertise_port,
        );
        let state = AppState {
            device: self.device.clone(),
            handler: self.handler.clone(),
        };
        let app = api::router(state, guard);

        let server_cancel = self.cancel.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
            {
                tracing::error!("Control server error: {}", e);
            }
        });

        tracing::info!(
            "ECP API listening on {} (advertised as {})",
            local_addr,
            self.device.identity.location()
        );

        self.api = Some(ApiServer { local_addr, task });
        Ok(())
    }

    /// Stop both engines and release their sockets. Safe to call when stopped.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        self.discovery.stop().await;

        if let Some(mut api) = self.api.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut api.task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Control server task failed: {}", e),
                Err(_) => {
                    tracing::warn!(
                        "Control server did not drain within {:?}, abandoning in-flight requests",
                        SHUTDOWN_GRACE
                    );
                    api.task.abort();
                    let _ = api.task.await;
                }
            }
            tracing::info!("ECP API on {} stopped", api.local_addr);
        }
    }
}
