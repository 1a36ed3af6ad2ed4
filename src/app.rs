//! Session state management for PacketForge
//!
//! [`App`] owns everything a wizard session knows: the connected server, the
//! interface catalog and selection, the loaded packets and the activity log.
//! Each operation goes through the [`Backend`] and records what happened.

use crate::browse::PacketBrowser;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::network::interface::find_interface;
use crate::network::mock::MockBackend;
use crate::network::{Backend, CaptureFile, NetworkInterface, PacketOrigin, ServerAddr};
use crate::packet::{Packet, TIMESTAMP_FORMAT};
use serde::Serialize;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Characters of a packet id shown in log lines
const LOG_ID_LEN: usize = 10;

/// Session shared between tasks. Holding the lock across an operation
/// queues concurrent callers behind it.
pub type SharedApp = Arc<tokio::sync::Mutex<App>>;

/// Stage of the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WizardStep {
    #[default]
    Server,
    InterfaceSelection,
    PacketEditor,
    Logs,
}

impl WizardStep {
    pub fn name(&self) -> &'static str {
        match self {
            WizardStep::Server => "Server",
            WizardStep::InterfaceSelection => "Interface",
            WizardStep::PacketEditor => "Editor",
            WizardStep::Logs => "Logs",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The server the session is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    pub ip: String,
    pub port: u16,
    pub connected: bool,
}

impl ServerInfo {
    pub fn addr(&self) -> ServerAddr {
        ServerAddr {
            ip: self.ip.clone(),
            port: self.port,
        }
    }
}

/// Activity log entry
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: uuid::Uuid,
    pub timestamp: chrono::DateTime<chrono::Local>,
    pub level: LogLevel,
    pub action: String,
    pub details: String,
}

impl LogEntry {
    pub fn timestamp_display(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.timestamp_display(),
            self.level.symbol(),
            self.action,
            self.details
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogLevel::Info => "[i]",
            LogLevel::Success => "[+]",
            LogLevel::Warning => "[!]",
            LogLevel::Error => "[x]",
        }
    }
}

/// Validate connection form input
pub fn parse_server_addr(ip: &str, port: &str) -> Result<ServerAddr> {
    let ip = ip.trim();
    let port = port.trim();

    if ip.is_empty() || port.is_empty() {
        return Err(Error::validation("IP address and port are required."));
    }
    if ip.parse::<Ipv4Addr>().is_err() {
        return Err(Error::validation("Invalid IP Address format."));
    }
    let port = match port.parse::<u16>() {
        Ok(p) if p > 0 => p,
        _ => return Err(Error::validation("Invalid Port Number (must be 1-65535).")),
    };

    Ok(ServerAddr {
        ip: ip.to_string(),
        port,
    })
}

/// Main session state
pub struct App {
    backend: Arc<dyn Backend>,

    step: WizardStep,
    server: Option<ServerInfo>,
    interfaces: Vec<NetworkInterface>,
    selected_interface: Option<NetworkInterface>,

    // Capture list
    packets: Vec<Packet>,
    browser: PacketBrowser,

    // Append-only activity log, oldest first
    logs: Vec<LogEntry>,
}

impl App {
    pub fn new(config: &Config, backend: Arc<dyn Backend>) -> Self {
        let browser = PacketBrowser::new(config.session.page_size);
        tracing::debug!(backend = backend.name(), "Session created");

        Self {
            backend,
            step: WizardStep::Server,
            server: None,
            interfaces: Vec::new(),
            selected_interface: None,
            packets: Vec::new(),
            browser,
            logs: Vec::new(),
        }
    }

    /// Session backed by the simulated backend from `config.mock`.
    /// Fails with [`Error::Config`] when the settings do not validate.
    pub fn with_mock(config: &Config) -> Result<Self> {
        config.validate()?;
        let backend = Arc::new(MockBackend::new(config.mock.clone())?);
        Ok(Self::new(config, backend))
    }

    pub fn into_shared(self) -> SharedApp {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn server(&self) -> Option<&ServerInfo> {
        self.server.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.server.as_ref().is_some_and(|s| s.connected)
    }

    pub fn interfaces(&self) -> &[NetworkInterface] {
        &self.interfaces
    }

    pub fn selected_interface(&self) -> Option<&NetworkInterface> {
        self.selected_interface.as_ref()
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn packet(&self, id: &str) -> Option<&Packet> {
        self.packets.iter().find(|p| p.id() == id)
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Log entries in display order
    pub fn logs_newest_first(&self) -> impl Iterator<Item = &LogEntry> {
        self.logs.iter().rev()
    }

    // =========================================================================
    // Capture list browsing
    // =========================================================================

    pub fn browser(&self) -> &PacketBrowser {
        &self.browser
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.browser.set_query(query);
    }

    pub fn filtered_packets(&self) -> Vec<&Packet> {
        self.browser.filtered(&self.packets)
    }

    pub fn visible_packets(&self) -> Vec<&Packet> {
        self.browser.visible(&self.packets)
    }

    pub fn total_pages(&self) -> usize {
        self.browser.total_pages(&self.packets)
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.browser.go_to(page, &self.packets);
    }

    pub fn next_page(&mut self) {
        self.browser.next_page(&self.packets);
    }

    pub fn prev_page(&mut self) {
        self.browser.prev_page(&self.packets);
    }

    // =========================================================================
    // Logging
    // =========================================================================

    /// Append an activity log entry
    pub fn log(&mut self, level: LogLevel, action: impl Into<String>, details: impl Into<String>) {
        let entry = LogEntry {
            id: uuid::Uuid::new_v4(),
            timestamp: chrono::Local::now(),
            level,
            action: action.into(),
            details: details.into(),
        };
        self.logs.push(entry);
    }

    pub fn log_info(&mut self, action: impl Into<String>, details: impl Into<String>) {
        let (action, details) = (action.into(), details.into());
        tracing::info!(action = %action, "{}", details);
        self.log(LogLevel::Info, action, details);
    }

    pub fn log_success(&mut self, action: impl Into<String>, details: impl Into<String>) {
        let (action, details) = (action.into(), details.into());
        tracing::info!(action = %action, status = "success", "{}", details);
        self.log(LogLevel::Success, action, details);
    }

    pub fn log_warning(&mut self, action: impl Into<String>, details: impl Into<String>) {
        let (action, details) = (action.into(), details.into());
        tracing::warn!(action = %action, "{}", details);
        self.log(LogLevel::Warning, action, details);
    }

    pub fn log_error(&mut self, action: impl Into<String>, details: impl Into<String>) {
        let (action, details) = (action.into(), details.into());
        tracing::error!(action = %action, "{}", details);
        self.log(LogLevel::Error, action, details);
    }

    // =========================================================================
    // Wizard operations
    // =========================================================================

    /// Connect to a capture server and load its interface catalog.
    ///
    /// Malformed input is rejected before anything is logged. Any previous
    /// server, selection and packets are dropped first.
    pub async fn connect(&mut self, ip: &str, port: &str) -> Result<ServerInfo> {
        let addr = parse_server_addr(ip, port)?;
        self.clear_session();

        self.log_info("Connection Attempt", format!("Trying to connect to {}...", addr));

        let result = self.backend.connect(&addr).await;
        match result {
            Ok(interfaces) => {
                let info = ServerInfo {
                    ip: addr.ip.clone(),
                    port: addr.port,
                    connected: true,
                };
                self.server = Some(info.clone());
                self.interfaces = interfaces;
                self.step = WizardStep::InterfaceSelection;
                self.log_success("Server Connected", format!("Successfully connected to {}.", addr));
                Ok(info)
            }
            Err(e) => {
                self.clear_session();
                self.log_error(
                    "Connection Failed",
                    format!("Failed to connect to {}. Error: {}", addr, e.message()),
                );
                Err(e)
            }
        }
    }

    /// Pick the interface packets are sent on
    pub fn select_interface(&mut self, id: &str) -> Result<NetworkInterface> {
        if !self.is_connected() {
            return Err(Error::validation("Not connected to a server."));
        }
        let iface = find_interface(&self.interfaces, id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("Unknown interface '{}'.", id)))?;

        if self.selected_interface.as_ref().is_some_and(|cur| cur.id != iface.id) {
            self.discard_packets();
        }

        self.selected_interface = Some(iface.clone());
        self.step = WizardStep::PacketEditor;
        self.log_success(
            "Interface Selected",
            format!("Interface {} ({}) selected.", iface.name, iface.description),
        );
        Ok(iface)
    }

    /// Load packets from a capture file, replacing the current list
    pub async fn upload_capture(&mut self, file: &CaptureFile) -> Result<&[Packet]> {
        self.require_interface()?;

        self.log_info(
            "PCAP Upload",
            format!("Processing file: {} ({:.2} KB)", file.name, file.size_kb()),
        );
        self.discard_packets();

        let result = self.backend.parse_capture(file).await;
        match result {
            Ok(packets) => {
                let count = packets.len();
                self.packets = packets;
                self.log_success(
                    "PCAP Processed",
                    format!("File {} processed. {} packets loaded (Simulated).", file.name, count),
                );
                Ok(self.packets.as_slice())
            }
            Err(e) => {
                self.log_error(
                    "PCAP Failed",
                    format!("File {} could not be processed. Error: {}", file.name, e.message()),
                );
                Err(e)
            }
        }
    }

    /// Send a packet on the selected interface
    pub async fn send_packet(&mut self, packet: &Packet, origin: PacketOrigin) -> Result<()> {
        let iface = self.require_interface()?.clone();
        let short_id = packet.short_id(LOG_ID_LEN);

        self.log_info(
            format!("Packet Sending ({})", origin),
            format!("Attempting to send packet ID: {}...", short_id),
        );

        let result = self.backend.send_raw(packet, &iface).await;
        match result {
            Ok(()) => {
                self.log_success(
                    "Packet Sent",
                    format!(
                        "Packet ID: {}... sent via {}. Status: Success (Simulated).",
                        short_id, iface.name
                    ),
                );
                Ok(())
            }
            Err(e) => {
                self.log_error(
                    "Packet Send Failed",
                    format!(
                        "Packet ID: {}... could not be sent via {}. Error: {}",
                        short_id,
                        iface.name,
                        e.message()
                    ),
                );
                Err(e)
            }
        }
    }

    /// Build a packet from hex text and send it
    pub async fn send_hex(&mut self, hex_input: &str) -> Result<Packet> {
        let packet = Packet::manual(hex_input)?;
        self.send_packet(&packet, PacketOrigin::Manual).await?;
        Ok(packet)
    }

    /// Send one of the loaded capture packets by id
    pub async fn send_loaded(&mut self, id: &str) -> Result<()> {
        let packet = self
            .packet(id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("No loaded packet with id '{}'.", id)))?;
        self.send_packet(&packet, PacketOrigin::Pcap).await
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Whether `step` can be entered right now
    pub fn step_enabled(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Server | WizardStep::Logs => true,
            WizardStep::InterfaceSelection => self.is_connected(),
            WizardStep::PacketEditor => self.selected_interface.is_some(),
        }
    }

    /// Move to another wizard step.
    ///
    /// Going back to the server step disconnects; going back to the interface
    /// step drops the selection and the loaded packets.
    pub fn navigate(&mut self, step: WizardStep) -> Result<()> {
        if !self.step_enabled(step) {
            return Err(Error::validation(format!("{} step is not available yet.", step)));
        }

        match step {
            WizardStep::Server => {
                let connected = self.server.as_ref().filter(|s| s.connected).map(ServerInfo::addr);
                match connected {
                    Some(addr) => self.log_warning(
                        "Server Disconnected",
                        format!("Disconnected from {}. Returning to server selection.", addr),
                    ),
                    None => self.log_info("Navigation", "Navigating to Server Selection."),
                }
                self.clear_session();
            }
            WizardStep::InterfaceSelection => {
                match self.selected_interface.take() {
                    Some(prev) => self.log_info(
                        "Interface Deselected",
                        format!("Returning to interface selection. Previously selected: {}.", prev.name),
                    ),
                    None => self.log_info("Navigation", "Navigating to Interface Selection."),
                }
                self.discard_packets();
            }
            WizardStep::PacketEditor => self.log_info("Navigation", "Navigating to Packet Editor."),
            WizardStep::Logs => self.log_info("Navigation", "Navigating to Logs."),
        }

        self.step = step;
        Ok(())
    }

    /// Drop the server connection and everything that depends on it
    pub fn disconnect(&mut self) -> Result<()> {
        self.navigate(WizardStep::Server)
    }

    fn require_interface(&self) -> Result<&NetworkInterface> {
        self.selected_interface
            .as_ref()
            .ok_or_else(|| Error::validation("No interface selected."))
    }

    fn discard_packets(&mut self) {
        self.packets.clear();
        self.browser.reset();
    }

    fn clear_session(&mut self) {
        self.server = None;
        self.interfaces.clear();
        self.selected_interface = None;
        self.discard_packets();
        self.step = WizardStep::Server;
    }
}
