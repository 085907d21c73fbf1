use std::sync::Arc;
use async_trait::async_trait;
use anyhow::{Context, Result};
use ecp_emulatord::{CommandHandler, Config, EcpEmulator};

/// Logs every command it receives. Stands in for a real integration.
struct LoggingHandler;

#[async_trait]
impl CommandHandler for LoggingHandler {
    async fn on_keypress(&self, usn: &str, key: &str) -> Result<()> {
        tracing::info!("[{}] keypress {}", usn, key);
        Ok(())
    }

    async fn on_keydown(&self, usn: &str, key: &str) -> Result<()> {
        tracing::info!("[{}] keydown {}", usn, key);
        Ok(())
    }

    async fn on_keyup(&self, usn: &str, key: &str) -> Result<()> {
        tracing::info!("[{}] keyup {}", usn, key);
        Ok(())
    }

    async fn launch(&self, usn: &str, app_id: &str) -> Result<()> {
        tracing::info!("[{}] launch {}", usn, app_id);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ecp_emulatord=info"))
        )
        .init();

    tracing::info!("Starting ecp-emulatord");

    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/etc/ecp-emulator/emulatord.toml".to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    tracing::info!("Loaded config from {}", config_path);

    let mut emulator = EcpEmulator::new(config, Arc::new(LoggingHandler));

    let identity = &emulator.device().identity;
    tracing::info!(
        "Emulating \"{}\" (usn {}) with {} apps",
        identity.friendly_name,
        identity.usn,
        emulator.device().apps.len()
    );

    emulator
        .start()
        .await
        .context("Failed to start emulator")?;

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutdown signal received");

    emulator.stop().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
