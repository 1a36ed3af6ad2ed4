//! Backend seam for interface discovery, packet transmission and capture parsing
//!
//! The session controller only talks to a [`Backend`]. The bundled
//! [`mock::MockBackend`] simulates every operation with delays and random data.

pub mod generator;
pub mod interface;
pub mod mock;

pub use interface::NetworkInterface;

use crate::error::Result;
use crate::packet::Packet;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Address of the capture server the session connects to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddr {
    pub ip: String,
    pub port: u16,
}

impl std::fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

/// Capture file handed to the backend. Only its name and size are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureFile {
    pub name: String,
    pub size: u64,
}

impl CaptureFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Read name and size from the filesystem without touching the contents
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, metadata.len()))
    }

    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }

    /// Whether the name carries a capture file extension
    pub fn has_capture_extension(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        name.ends_with(".pcap") || name.ends_with(".pcapng")
    }
}

/// Where a packet handed to [`Backend::send_raw`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacketOrigin {
    Manual,
    Pcap,
}

impl std::fmt::Display for PacketOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PacketOrigin::Manual => write!(f, "manual"),
            PacketOrigin::Pcap => write!(f, "pcap"),
        }
    }
}

/// Capability a capture agent offers to the session
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Connect to the server and enumerate its interfaces
    async fn connect(&self, server: &ServerAddr) -> Result<Vec<NetworkInterface>>;

    /// Transmit a packet on the given interface
    async fn send_raw(&self, packet: &Packet, interface: &NetworkInterface) -> Result<()>;

    /// Turn a capture file into packets
    async fn parse_capture(&self, file: &CaptureFile) -> Result<Vec<Packet>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_file_size_kb() {
        let file = CaptureFile::new("test.pcap", 2048);
        assert!((file.size_kb() - 2.0).abs() < f64::EPSILON);
        assert!(file.has_capture_extension());
        assert!(CaptureFile::new("dump.PCAPNG", 0).has_capture_extension());
        assert!(!CaptureFile::new("notes.txt", 0).has_capture_extension());
    }

    #[test]
    fn test_capture_file_from_path() {
        let path = std::env::temp_dir().join(format!("packetforge-{}.pcap", uuid::Uuid::new_v4()));
        std::fs::write(&path, [0u8; 100]).unwrap();
        let file = CaptureFile::from_path(&path).unwrap();
        assert_eq!(file.size, 100);
        assert!(file.name.ends_with(".pcap"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_capture_file_missing_path() {
        let path = std::env::temp_dir().join(format!("packetforge-missing-{}.pcap", uuid::Uuid::new_v4()));
        assert!(CaptureFile::from_path(&path).is_err());
    }

    #[test]
    fn test_display_impls() {
        let addr = ServerAddr { ip: "127.0.0.1".into(), port: 8080 };
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
        assert_eq!(PacketOrigin::Manual.to_string(), "manual");
        assert_eq!(PacketOrigin::Pcap.to_string(), "pcap");
    }
}
