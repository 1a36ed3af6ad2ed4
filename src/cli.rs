//! Command line interface

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use packetforge::config::Config;
use packetforge::network::interface::mock_interfaces;
use packetforge::{App, CaptureFile, Packet};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "packetforge", version, about = "Craft and send packets through a simulated capture server")]
pub struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Config file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a whole session: connect, pick an interface, send and browse packets
    Run {
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,

        #[arg(short, long, default_value = "8080")]
        port: String,

        /// Interface id to select
        #[arg(short, long, default_value = "eth0")]
        interface: String,

        /// Hex payloads to send (repeatable)
        #[arg(long = "hex")]
        hex: Vec<String>,

        /// Capture file to load
        #[arg(long)]
        capture: Option<PathBuf>,

        /// Search query for the loaded packets
        #[arg(short, long, default_value = "")]
        query: String,

        /// Page of the loaded packets to show
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Send every packet on the shown page
        #[arg(long)]
        send_page: bool,

        /// Skip the simulated delays
        #[arg(long)]
        instant: bool,
    },

    /// Show the packet derived from hex input
    Hex {
        input: String,
    },

    /// List the interfaces a simulated server offers
    Interfaces,
}

pub async fn run_command(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref()).context("failed to load config")?;

    match args.command {
        Command::Run {
            ip,
            port,
            interface,
            hex,
            capture,
            query,
            page,
            send_page,
            instant,
        } => {
            if instant {
                config.mock = config.mock.without_delays();
            }
            let mut app = App::with_mock(&config).context("invalid session settings")?;
            let outcome = run_session(&mut app, &ip, &port, &interface, &hex, capture, &query, page, send_page).await;
            print_logs(&app);
            outcome
        }
        Command::Hex { input } => {
            let packet = Packet::manual(&input).context("invalid hex input")?;
            print_packet(&packet);
            Ok(())
        }
        Command::Interfaces => {
            for iface in mock_interfaces() {
                println!("{:<8} {}", iface.id, iface.description);
            }
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_session(
    app: &mut App,
    ip: &str,
    port: &str,
    interface: &str,
    hex: &[String],
    capture: Option<PathBuf>,
    query: &str,
    page: usize,
    send_page: bool,
) -> Result<()> {
    let server = app.connect(ip, port).await?;
    println!("Connected to {}:{}", server.ip, server.port);

    for iface in app.interfaces() {
        println!("  {:<8} {}", iface.id, iface.description);
    }
    let selected = app.select_interface(interface)?;
    println!("Using interface {}", selected);

    for input in hex {
        let packet = app.send_hex(input).await?;
        println!("Sent {}", packet);
    }

    if let Some(path) = capture {
        let file = CaptureFile::from_path(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if !file.has_capture_extension() {
            tracing::warn!("{} does not look like a capture file", file.name);
        }
        app.upload_capture(&file).await?;

        app.set_search(query);
        app.go_to_page(page);
        print_page(app);

        if send_page {
            let ids: Vec<String> = app.visible_packets().iter().map(|p| p.id().to_string()).collect();
            for id in ids {
                app.send_loaded(&id).await?;
            }
        }
    }

    Ok(())
}

fn print_page(app: &App) {
    let browser = app.browser();
    println!(
        "\nPackets (query {:?}): {} of {} match, page {}/{}",
        browser.query(),
        app.filtered_packets().len(),
        app.packets().len(),
        browser.page(),
        app.total_pages().max(1)
    );
    println!("{:<24} {:<16} {:<14} {:<6} {:>6}  {}", "ID", "SOURCE", "DESTINATION", "PROTO", "BYTES", "TIME");
    for p in app.visible_packets() {
        println!(
            "{:<24} {:<16} {:<14} {:<6} {:>6}  {}",
            p.id(),
            p.source(),
            p.destination(),
            p.protocol(),
            p.byte_len(),
            p.timestamp().unwrap_or("-")
        );
    }
}

fn print_packet(packet: &Packet) {
    println!("id:       {}", packet.id());
    println!("protocol: {}", packet.protocol());
    println!("length:   {} bytes", packet.byte_len());
    println!("hex:      {}", packet.hex_grouped());
    println!("binary:   {}", packet.binary_grouped());
}

fn print_logs(app: &App) {
    println!("\nActivity log (newest first):");
    for entry in app.logs_newest_first() {
        println!("  {}", entry);
    }
}
