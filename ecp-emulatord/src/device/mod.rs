pub mod apps;
pub mod render;

use std::net::IpAddr;
use uuid::Uuid;
use crate::config::Config;
use crate::net;

pub use apps::AppCatalog;

const USN_LEN: usize = 12;

/// Identity of the emulated device. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub usn: String,
    pub friendly_name: String,
    pub serial_number: String,
    /// UDN without the `uuid:` prefix
    pub udn: String,
    pub advertise_ip: IpAddr,
    /// Advertised control port; may differ from the listening port and may be 0
    pub advertise_port: u16,
}

impl DeviceIdentity {
    /// When `usn` is `None` it is derived from the advertised address, so a
    /// device keeps the same USN across restarts on the same address.
    pub fn new(
        friendly_name: impl Into<String>,
        usn: Option<String>,
        advertise_ip: IpAddr,
        advertise_port: u16,
    ) -> Self {
        let udn = Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("{}:{}", advertise_ip, advertise_port).as_bytes(),
        )
        .to_string();

        let usn = usn.unwrap_or_else(|| derive_usn(advertise_ip, advertise_port));

        Self {
            serial_number: usn.clone(),
            usn,
            friendly_name: friendly_name.into(),
            udn,
            advertise_ip,
            advertise_port,
        }
    }

    /// URL of the root description, as sent in discovery replies
    pub fn location(&self) -> String {
        match self.advertise_ip {
            IpAddr::V4(ip) => format!("http://{}:{}/", ip, self.advertise_port),
            IpAddr::V6(ip) => format!("http://[{}]:{}/", ip, self.advertise_port),
        }
    }
}

fn derive_usn(advertise_ip: IpAddr, advertise_port: u16) -> String {
    let seed = format!("{}{}", advertise_ip, advertise_port);
    let mut usn = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes())
        .simple()
        .to_string()
        .to_uppercase();
    usn.truncate(USN_LEN);
    usn
}

/// Identity plus app catalog, shared read-only by the discovery responder
/// and the command server.
#[derive(Debug, Clone)]
pub struct Device {
    pub identity: DeviceIdentity,
    pub apps: AppCatalog,
}

impl Device {
    pub fn new(identity: DeviceIdentity, apps: AppCatalog) -> Self {
        Self { identity, apps }
    }

    /// Resolve the advertised address from config. An unspecified advertise
    /// address is replaced by the detected LAN address.
    pub fn from_config(config: &Config) -> Self {
        let mut advertise_ip = config.api.advertise_ip.unwrap_or(config.api.host_ip);
        if advertise_ip.is_unspecified() {
            advertise_ip = net::local_ip();
            tracing::info!("Advertising detected local address {}", advertise_ip);
        }

        let identity = DeviceIdentity::new(
            config.device.name.clone(),
            config.device.usn.clone(),
            advertise_ip,
            config.api.effective_advertise_port(),
        );
        let apps = AppCatalog::parse(config.device.custom_apps.as_deref());

        Self::new(identity, apps)
    }

    pub fn usn(&self) -> &str {
        &self.identity.usn
    }

    pub fn render_device_info(&self) -> String {
        render::device_info(&self.identity)
    }

    pub fn render_app_list(&self) -> String {
        render::app_list(&self.apps)
    }

    pub fn render_root_description(&self) -> String {
        render::root_description(&self.identity)
    }
}
