//! Network interface catalog

use serde::{Deserialize, Serialize};

/// A capture/injection interface offered by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Identifier used to select the interface (e.g. "eth0")
    pub id: String,
    pub name: String,
    pub description: String,
}

impl NetworkInterface {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

impl std::fmt::Display for NetworkInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.description)
    }
}

/// Interfaces every simulated server reports
pub fn mock_interfaces() -> Vec<NetworkInterface> {
    vec![
        NetworkInterface::new("eth0", "eth0", "Ethernet interface (e.g., 1Gbps)"),
        NetworkInterface::new("wlan0", "wlan0", "Wireless LAN interface (e.g., Wi-Fi 6)"),
        NetworkInterface::new("lo", "lo", "Loopback interface (127.0.0.1)"),
        NetworkInterface::new("ppp0", "ppp0", "Point-to-Point Protocol (e.g., VPN)"),
    ]
}

/// Look up an interface by id
pub fn find_interface<'a>(
    interfaces: &'a [NetworkInterface],
    id: &str,
) -> Option<&'a NetworkInterface> {
    interfaces.iter().find(|i| i.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_catalog() {
        let interfaces = mock_interfaces();
        assert_eq!(interfaces.len(), 4);
        let ids: Vec<&str> = interfaces.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["eth0", "wlan0", "lo", "ppp0"]);
    }

    #[test]
    fn test_find_interface() {
        let interfaces = mock_interfaces();
        assert_eq!(find_interface(&interfaces, "lo").unwrap().name, "lo");
        assert!(find_interface(&interfaces, "eth9").is_none());
    }

    #[test]
    fn test_display() {
        let iface = NetworkInterface::new("lo", "lo", "Loopback interface (127.0.0.1)");
        assert_eq!(iface.to_string(), "lo (Loopback interface (127.0.0.1))");
    }
}
