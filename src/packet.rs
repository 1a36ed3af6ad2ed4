//! Packet record model
//!
//! A packet carries its payload as lowercase hex plus a derived binary
//! rendering (one 4-bit group per hex digit).

use crate::config::Protocol;
use crate::error::{Error, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Display format for packet and log timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Address placeholder for hand-crafted packets
pub const MANUAL_ADDRESS: &str = "N/A (Manual)";

static MANUAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// A single network packet, captured or crafted.
///
/// Fields are only set by the constructors, so the payload is always even
/// length lowercase hex with a matching binary rendering and byte length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Packet {
    id: String,
    source: String,
    destination: String,
    protocol: String,
    hex_data: String,
    binary_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<usize>,
}

impl Packet {
    /// Build a packet from hex text. Whitespace is ignored and case folded.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        protocol: impl Into<String>,
        hex_input: &str,
        timestamp: Option<String>,
    ) -> Result<Self> {
        let hex_data = normalize_hex(hex_input)?;
        let binary_data = hex_to_binary(&hex_data)?;
        let length = hex_data.len() / 2;

        Ok(Self {
            id: id.into(),
            source: source.into(),
            destination: destination.into(),
            protocol: protocol.into(),
            hex_data,
            binary_data,
            timestamp,
            length: Some(length),
        })
    }

    /// Packet around raw payload bytes, used by the capture generator
    pub(crate) fn from_payload(
        id: String,
        source: String,
        destination: String,
        protocol: &str,
        payload: &[u8],
        timestamp: Option<String>,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            protocol: protocol.to_string(),
            hex_data: hex::encode(payload),
            binary_data: bytes_to_binary(payload),
            timestamp,
            length: Some(payload.len()),
        }
    }

    /// Packet typed in by the user in the editor
    pub fn manual(hex_input: &str) -> Result<Self> {
        let now = chrono::Local::now();
        let seq = MANUAL_SEQ.fetch_add(1, Ordering::Relaxed);
        Self::new(
            format!("manual-{}-{}", now.timestamp_millis(), seq),
            MANUAL_ADDRESS,
            MANUAL_ADDRESS,
            Protocol::Raw.label(),
            hex_input,
            Some(now.format(TIMESTAMP_FORMAT).to_string()),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Lowercase hex payload
    pub fn hex_data(&self) -> &str {
        &self.hex_data
    }

    /// Payload as 4-bit groups, one per hex digit
    pub fn binary_data(&self) -> &str {
        &self.binary_data
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    pub fn length(&self) -> Option<usize> {
        self.length
    }

    /// Payload size in bytes
    pub fn byte_len(&self) -> usize {
        self.hex_data.len() / 2
    }

    /// Decode the payload into raw bytes
    pub fn bytes(&self) -> Result<Vec<u8>> {
        hex::decode(&self.hex_data).map_err(|e| Error::validation(format!("bad hex payload: {}", e)))
    }

    /// Id cut down to `max` characters for log lines
    pub fn short_id(&self, max: usize) -> &str {
        match self.id.char_indices().nth(max) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// Hex payload split into space separated bytes
    pub fn hex_grouped(&self) -> String {
        group(&self.hex_data, 2)
    }

    /// Binary payload split into space separated octets
    pub fn binary_grouped(&self) -> String {
        group(&self.binary_data, 8)
    }

    /// One line summary for list views
    pub fn summary(&self) -> String {
        format!(
            "{} {} → {} {} bytes",
            self.protocol,
            self.source,
            self.destination,
            self.byte_len()
        )
    }
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.id, self.summary())
    }
}

/// Strip whitespace, check the digits, and lowercase.
///
/// Empty input, non-hex characters and odd digit counts are rejected.
pub fn normalize_hex(input: &str) -> Result<String> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(Error::validation("hex data cannot be empty"));
    }
    if let Some(bad) = cleaned.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(Error::validation(format!(
            "invalid hex character '{}': only 0-9 and a-f are allowed",
            bad
        )));
    }
    if cleaned.len() % 2 != 0 {
        return Err(Error::validation(format!(
            "odd-length hex ({} digits): each byte needs two digits",
            cleaned.len()
        )));
    }

    Ok(cleaned.to_ascii_lowercase())
}

/// Expand each hex digit into its zero padded 4-bit form
pub fn hex_to_binary(hex: &str) -> Result<String> {
    let mut out = String::with_capacity(hex.len() * 4);
    for c in hex.chars().filter(|c| !c.is_whitespace()) {
        let nibble = c
            .to_digit(16)
            .ok_or_else(|| Error::validation(format!("invalid hex character '{}'", c)))?;
        out.push_str(&format!("{:04b}", nibble));
    }
    Ok(out)
}

/// Regroup a binary string into nibbles and render them as lowercase hex
pub fn binary_to_hex(binary: &str) -> Result<String> {
    if binary.len() % 4 != 0 {
        return Err(Error::validation(format!(
            "binary length {} is not a multiple of 4",
            binary.len()
        )));
    }

    binary
        .as_bytes()
        .chunks(4)
        .map(|chunk| {
            let mut nibble = 0u32;
            for &bit in chunk {
                nibble = match bit {
                    b'0' => nibble << 1,
                    b'1' => (nibble << 1) | 1,
                    other => {
                        return Err(Error::validation(format!(
                            "invalid binary digit '{}'",
                            other as char
                        )))
                    }
                };
            }
            std::char::from_digit(nibble, 16)
                .ok_or_else(|| Error::validation("nibble out of range"))
        })
        .collect()
}

fn bytes_to_binary(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:08b}", b)).collect()
}

fn group(s: &str, width: usize) -> String {
    s.as_bytes()
        .chunks(width)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
