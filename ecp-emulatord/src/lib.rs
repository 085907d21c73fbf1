//! Network presence of an ECP set-top box: an SSDP discovery responder and
//! an ECP control server that forwards key and launch commands to a
//! user-supplied [`CommandHandler`].

pub mod api;
pub mod config;
pub mod device;
pub mod discovery;
pub mod emulator;
pub mod error;
pub mod handler;
pub mod net;

pub use config::Config;
pub use device::{AppCatalog, Device, DeviceIdentity};
pub use emulator::EcpEmulator;
pub use error::EmulatorError;
pub use handler::{keys, CommandHandler, NoopHandler};
