//! Configuration management for PacketForge

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub mock: MockConfig,
}

impl Config {
    /// Default config file location
    pub fn default_file_path() -> PathBuf {
        let config_dir = if cfg!(windows) {
            std::env::var("APPDATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
        } else {
            std::env::var("HOME")
                .map(|h| PathBuf::from(h).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        };
        config_dir.join("packetforge").join("config.json")
    }

    /// Load configuration from a JSON file. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(|p| p.to_path_buf()).unwrap_or_else(Self::default_file_path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&json)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Save configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.session.page_size == 0 {
            return Err(Error::Config("session.page_size must be at least 1".into()));
        }
        self.mock.validate()
    }
}

/// Session controller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Packets shown per page in the capture browser
    pub page_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

/// Settings of the simulated backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub connect_delay_ms: u64,
    pub send_delay_ms: u64,
    pub upload_delay_ms: u64,
    pub parse_delay_ms: u64,
    /// Smallest and largest number of packets an upload produces
    pub batch_min: usize,
    pub batch_max: usize,
    /// Payload length bounds in bytes
    pub payload_min: usize,
    pub payload_max: usize,
    /// Largest backdating offset for generated timestamps
    pub max_backdate_secs: u64,
    /// Address treated as unreachable
    pub unreachable_ip: String,
    pub fail_send: bool,
    pub fail_upload: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            connect_delay_ms: 1500,
            send_delay_ms: 1000,
            upload_delay_ms: 2000,
            parse_delay_ms: 1500,
            batch_min: 10,
            batch_max: 49,
            payload_min: 10,
            payload_max: 59,
            max_backdate_secs: 10_000,
            unreachable_ip: "0.0.0.0".to_string(),
            fail_send: false,
            fail_upload: false,
        }
    }
}

impl MockConfig {
    /// Defaults with every simulated delay removed
    pub fn instant() -> Self {
        Self::default().without_delays()
    }

    /// Same settings with every simulated delay removed
    pub fn without_delays(self) -> Self {
        Self {
            connect_delay_ms: 0,
            send_delay_ms: 0,
            upload_delay_ms: 0,
            parse_delay_ms: 0,
            ..self
        }
    }

    /// Check that the batch and payload ranges can be sampled
    pub fn validate(&self) -> Result<()> {
        if self.batch_min > self.batch_max {
            return Err(Error::Config("mock.batch_min exceeds mock.batch_max".into()));
        }
        if self.payload_min == 0 || self.payload_min > self.payload_max {
            return Err(Error::Config(
                "mock payload range must be non-empty and start at 1 or more".into(),
            ));
        }
        Ok(())
    }

    pub fn batch_range(&self) -> RangeInclusive<usize> {
        self.batch_min..=self.batch_max
    }

    pub fn payload_range(&self) -> RangeInclusive<usize> {
        self.payload_min..=self.payload_max
    }
}

/// Protocol labels used by generated packets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Dns,
    Http,
    Raw,
}

impl Protocol {
    /// Protocols the mock capture parser draws from
    pub fn generated() -> &'static [Protocol] {
        &[
            Protocol::Tcp,
            Protocol::Udp,
            Protocol::Icmp,
            Protocol::Dns,
            Protocol::Http,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
            Protocol::Dns => "DNS",
            Protocol::Http => "HTTP",
            Protocol::Raw => "RAW",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.page_size, 10);
        assert_eq!(config.mock.batch_range(), 10..=49);
        assert_eq!(config.mock.payload_range(), 10..=59);
        assert_eq!(config.mock.unreachable_ip, "0.0.0.0");
        assert!(!config.mock.fail_send);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_instant_has_no_delays() {
        let mock = MockConfig::instant();
        assert_eq!(mock.connect_delay_ms, 0);
        assert_eq!(mock.send_delay_ms, 0);
        assert_eq!(mock.upload_delay_ms, 0);
        assert_eq!(mock.parse_delay_ms, 0);
        assert_eq!(mock.batch_min, 10);
    }

    #[test]
    fn test_without_delays_keeps_other_settings() {
        let mock = MockConfig {
            batch_min: 3,
            fail_upload: true,
            ..Default::default()
        }
        .without_delays();
        assert_eq!(mock.send_delay_ms, 0);
        assert_eq!(mock.batch_min, 3);
        assert!(mock.fail_upload);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"mock": {"send_delay_ms": 5, "fail_upload": true}}"#).unwrap();
        assert_eq!(config.mock.send_delay_ms, 5);
        assert!(config.mock.fail_upload);
        assert_eq!(config.mock.connect_delay_ms, 1500);
        assert_eq!(config.session.page_size, 10);
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let mut config = Config::default();
        config.mock.batch_min = 50;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.session.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.mock.payload_min = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("packetforge-test-{}", uuid::Uuid::new_v4()))
            .join("config.json");

        let mut config = Config::default();
        config.session.page_size = 25;
        config.mock.fail_send = true;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.session.page_size, 25);
        assert!(loaded.mock.fail_send);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let path = std::env::temp_dir().join(format!("packetforge-missing-{}.json", uuid::Uuid::new_v4()));
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.session.page_size, 10);
    }

    #[test]
    fn test_protocol_labels() {
        assert_eq!(Protocol::Tcp.to_string(), "TCP");
        assert_eq!(Protocol::Raw.to_string(), "RAW");
        assert_eq!(Protocol::generated().len(), 5);
        assert!(!Protocol::generated().contains(&Protocol::Raw));
    }
}
