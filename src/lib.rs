//! PacketForge - packet crafting sessions over a pluggable capture backend
//!
//! The bundled backend is simulated: connecting, listing interfaces, sending
//! and parsing captures all complete after fixed delays with generated data.

pub mod app;
pub mod browse;
pub mod config;
pub mod error;
pub mod network;
pub mod packet;

pub use app::{App, LogEntry, LogLevel, ServerInfo, SharedApp, WizardStep};
pub use config::Config;
pub use error::{Error, Result};
pub use network::{Backend, CaptureFile, NetworkInterface, PacketOrigin};
pub use packet::Packet;
