//! Simulated backend
//!
//! Sleeps for the configured delays and fabricates results. Send and upload
//! failures can be switched on at runtime for testing error paths.

use crate::config::MockConfig;
use crate::error::{Error, Result};
use crate::network::generator::{generate_random_packets_with, GeneratorConfig};
use crate::network::interface::mock_interfaces;
use crate::network::{Backend, CaptureFile, NetworkInterface, ServerAddr};
use crate::packet::Packet;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Runtime switches for the simulated failure paths
#[derive(Debug, Default)]
pub struct FailureInjection {
    fail_send: AtomicBool,
    fail_upload: AtomicBool,
}

impl FailureInjection {
    pub fn set_fail_send(&self, enabled: bool) {
        self.fail_send.store(enabled, Ordering::SeqCst);
    }

    pub fn set_fail_upload(&self, enabled: bool) {
        self.fail_upload.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_send(&self) -> bool {
        self.fail_send.load(Ordering::SeqCst)
    }

    pub fn fail_upload(&self) -> bool {
        self.fail_upload.load(Ordering::SeqCst)
    }
}

/// Record of a simulated transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRecord {
    pub packet_id: String,
    pub interface: String,
    pub bytes: usize,
}

/// Backend that fakes every operation
pub struct MockBackend {
    config: MockConfig,
    failures: FailureInjection,
    sent: Mutex<Vec<SentRecord>>,
    packets_sent: AtomicU64,
    bytes_sent: AtomicU64,
}

impl MockBackend {
    /// Backend for `config`. Ranges that cannot be sampled are rejected.
    pub fn new(config: MockConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Backend with all delays removed
    pub fn instant() -> Self {
        Self::build(MockConfig::instant())
    }

    fn build(config: MockConfig) -> Self {
        let failures = FailureInjection::default();
        failures.set_fail_send(config.fail_send);
        failures.set_fail_upload(config.fail_upload);

        Self {
            config,
            failures,
            sent: Mutex::new(Vec::new()),
            packets_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
        }
    }

    pub fn failures(&self) -> &FailureInjection {
        &self.failures
    }

    /// Transmissions simulated so far, oldest first
    pub fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().clone()
    }

    /// Packets and bytes sent so far
    pub fn stats(&self) -> (u64, u64) {
        (
            self.packets_sent.load(Ordering::Relaxed),
            self.bytes_sent.load(Ordering::Relaxed),
        )
    }

    async fn delay(ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    #[tracing::instrument(skip(self, server), fields(server = %server))]
    async fn connect(&self, server: &ServerAddr) -> Result<Vec<NetworkInterface>> {
        Self::delay(self.config.connect_delay_ms).await;

        if server.ip == self.config.unreachable_ip {
            tracing::debug!("Sentinel address, refusing connection");
            return Err(Error::connection("Invalid address."));
        }

        let interfaces = mock_interfaces();
        tracing::debug!("Reporting {} interfaces", interfaces.len());
        Ok(interfaces)
    }

    #[tracing::instrument(skip(self, packet, interface), fields(packet = %packet.id(), interface = %interface.name))]
    async fn send_raw(&self, packet: &Packet, interface: &NetworkInterface) -> Result<()> {
        Self::delay(self.config.send_delay_ms).await;

        if self.failures.fail_send() {
            tracing::debug!("Injected send failure");
            return Err(Error::Send(format!(
                "transmission on {} failed (injected)",
                interface.name
            )));
        }

        let bytes = packet.bytes()?.len();
        self.packets_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
        self.sent.lock().push(SentRecord {
            packet_id: packet.id().to_string(),
            interface: interface.id.clone(),
            bytes,
        });
        Ok(())
    }

    #[tracing::instrument(skip(self, file), fields(file = %file.name, size = file.size))]
    async fn parse_capture(&self, file: &CaptureFile) -> Result<Vec<Packet>> {
        Self::delay(self.config.upload_delay_ms).await;

        if self.failures.fail_upload() {
            tracing::debug!("Injected upload failure");
            return Err(Error::Upload(format!("could not read {} (injected)", file.name)));
        }

        Self::delay(self.config.parse_delay_ms).await;

        // The file contents are never read; a fresh batch stands in for them.
        let generator = GeneratorConfig::from(&self.config);
        let packets = {
            let mut rng = rand::thread_rng();
            let count = rng.gen_range(self.config.batch_range());
            generate_random_packets_with(&mut rng, count, &generator)
        };
        tracing::debug!("Generated {} packets", packets.len());
        Ok(packets)
    }
}
