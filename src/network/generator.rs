//! Synthetic packet generation
//!
//! Stands in for a capture parser: every packet gets private-range
//! addresses, a protocol label, a random payload and a backdated timestamp.

use crate::config::{MockConfig, Protocol};
use crate::packet::{Packet, TIMESTAMP_FORMAT};
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::RangeInclusive;

/// Shape of the generated packets
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Payload length range in bytes
    pub payload_len: RangeInclusive<usize>,
    /// Largest timestamp backdating offset in seconds
    pub max_backdate_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            payload_len: 10..=59,
            max_backdate_secs: 10_000,
        }
    }
}

impl From<&MockConfig> for GeneratorConfig {
    fn from(mock: &MockConfig) -> Self {
        Self {
            payload_len: mock.payload_range(),
            max_backdate_secs: mock.max_backdate_secs,
        }
    }
}

/// Generate `count` random packets with the thread-local RNG
pub fn generate_random_packets(count: usize) -> Vec<Packet> {
    generate_random_packets_with(&mut rand::thread_rng(), count, &GeneratorConfig::default())
}

/// Generate `count` random packets from the given RNG
pub fn generate_random_packets_with<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    config: &GeneratorConfig,
) -> Vec<Packet> {
    let now = chrono::Local::now();
    let batch = now.timestamp_millis();

    (0..count)
        .map(|i| {
            let source = format!("192.168.1.{}", rng.gen_range(1..=254));
            let destination = format!("10.0.0.{}", rng.gen_range(1..=254));
            let protocol = Protocol::generated()
                .choose(rng)
                .copied()
                .unwrap_or(Protocol::Tcp);

            let len = rng.gen_range(config.payload_len.clone());
            let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();

            let backdate = rng.gen_range(0..=config.max_backdate_secs);
            let timestamp = now - chrono::Duration::seconds(backdate as i64);

            Packet::from_payload(
                format!("pkt-{}-{}", batch, i),
                source,
                destination,
                protocol.label(),
                &payload,
                Some(timestamp.format(TIMESTAMP_FORMAT).to_string()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_count() {
        assert!(generate_random_packets(0).is_empty());
        assert_eq!(generate_random_packets(7).len(), 7);
    }

    #[test]
    fn test_generated_packet_invariants() {
        let mut rng = StdRng::seed_from_u64(42);
        let packets = generate_random_packets_with(&mut rng, 200, &GeneratorConfig::default());

        for packet in &packets {
            assert!(packet.source().starts_with("192.168.1."));
            assert!(packet.destination().starts_with("10.0.0."));
            let host: u8 = packet.source().rsplit('.').next().unwrap().parse().unwrap();
            assert!((1..=254).contains(&host));

            assert!(["TCP", "UDP", "ICMP", "DNS", "HTTP"].contains(&packet.protocol()));

            let len = packet.length().unwrap();
            assert!((10..=59).contains(&len));
            assert_eq!(packet.hex_data().len(), len * 2);
            assert_eq!(packet.binary_data().len(), 4 * packet.hex_data().len());
            assert!(packet.hex_data().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
            assert!(packet.timestamp().is_some());
        }
    }

    #[test]
    fn test_generated_ids_unique_within_batch() {
        let packets = generate_random_packets(50);
        let mut ids: Vec<&str> = packets.iter().map(|p| p.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert!(packets[0].id().starts_with("pkt-"));
    }

    #[test]
    fn test_custom_payload_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = GeneratorConfig {
            payload_len: 4..=4,
            max_backdate_secs: 0,
        };
        let packets = generate_random_packets_with(&mut rng, 10, &config);
        assert!(packets.iter().all(|p| p.byte_len() == 4));
    }
}
