use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use serde::Deserialize;
use anyhow::{Context, Result};
use shared::protocol::{ECP_PORT, MAX_AGE, SSDP_PORT};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Explicit USN. When absent it is derived from the advertised address.
    pub usn: Option<String>,
    /// `id:name` entries separated by comma or newline
    pub custom_apps: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host_ip")]
    pub host_ip: IpAddr,
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    pub advertise_ip: Option<IpAddr>,
    /// `Some(0)` is advertised verbatim; only `None` falls back to `listen_port`.
    pub advertise_port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_bind_multicast")]
    pub bind_multicast: bool,
    #[serde(default = "default_discovery_port")]
    pub port: u16,
    #[serde(default = "default_notify_interval")]
    pub notify_interval_secs: u64,
}

fn default_name() -> String {
    "Emulated Roku".to_string()
}

fn default_host_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_listen_port() -> u16 {
    ECP_PORT
}

// Windows does not deliver multicast to a socket bound on the group port
fn default_bind_multicast() -> bool {
    !cfg!(windows)
}

fn default_discovery_port() -> u16 {
    SSDP_PORT
}

fn default_notify_interval() -> u64 {
    MAX_AGE as u64
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            usn: None,
            custom_apps: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host_ip: default_host_ip(),
            listen_port: default_listen_port(),
            advertise_ip: None,
            advertise_port: None,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            bind_multicast: default_bind_multicast(),
            port: default_discovery_port(),
            notify_interval_secs: default_notify_interval(),
        }
    }
}

impl ApiConfig {
    /// Port written into discovery replies and the location URL
    pub fn effective_advertise_port(&self) -> u16 {
        self.advertise_port.unwrap_or(self.listen_port)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.device.name, "Emulated Roku");
        assert_eq!(config.api.listen_port, 8060);
        assert_eq!(config.api.host_ip, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.discovery.port, 1900);
        assert_eq!(config.discovery.notify_interval_secs, 300);
        assert_eq!(config.api.effective_advertise_port(), 8060);
    }

    #[test]
    fn test_explicit_zero_advertise_port_is_kept() {
        let config = Config::parse(
            r#"
            [api]
            listen_port = 8061
            advertise_port = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.api.advertise_port, Some(0));
        assert_eq!(config.api.effective_advertise_port(), 0);
    }

    #[test]
    fn test_missing_advertise_port_falls_back_to_listen_port() {
        let config = Config::parse(
            r#"
            [api]
            listen_port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.api.advertise_port, None);
        assert_eq!(config.api.effective_advertise_port(), 9000);
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
            [device]
            name = "Living Room"
            usn = "ABC123"
            custom_apps = "1:Netflix,2:YouTube"

            [api]
            host_ip = "192.168.1.10"
            advertise_ip = "10.0.0.1"

            [discovery]
            bind_multicast = false
            port = 11900
            "#,
        )
        .unwrap();

        assert_eq!(config.device.name, "Living Room");
        assert_eq!(config.device.usn.as_deref(), Some("ABC123"));
        assert_eq!(config.device.custom_apps.as_deref(), Some("1:Netflix,2:YouTube"));
        assert_eq!(config.api.advertise_ip, Some("10.0.0.1".parse().unwrap()));
        assert!(!config.discovery.bind_multicast);
        assert_eq!(config.discovery.port, 11900);
    }

    #[test]
    fn test_invalid_ip_is_rejected() {
        let result = Config::parse(
            r#"
            [api]
            host_ip = "not-an-ip"
            "#,
        );
        assert!(result.is_err());
    }
}
