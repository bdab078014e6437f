//! Nixie Cape Control Tool
//!
//! CLI for controlling the nixie cape daemon via D-Bus.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nixie_cape_client::{BusType, DaemonClient};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum CliBusType {
    /// Try session bus first, fall back to system bus
    #[default]
    Auto,
    /// Use session bus (for user services)
    Session,
    /// Use system bus (for system services)
    System,
}

impl From<CliBusType> for BusType {
    fn from(bus: CliBusType) -> Self {
        match bus {
            CliBusType::Auto => BusType::Auto,
            CliBusType::Session => BusType::Session,
            CliBusType::System => BusType::System,
        }
    }
}

#[derive(Parser)]
#[command(name = "nixiecapectl")]
#[command(about = "Control tool for the nixie cape daemon")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// D-Bus bus type to use
    #[arg(long, default_value = "auto", value_enum)]
    bus: CliBusType,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// VFD display commands
    Vfd {
        #[command(subcommand)]
        action: VfdCommands,
    },
    /// Nixie tube commands
    Nixie {
        #[command(subcommand)]
        action: NixieCommands,
    },
    /// Daemon control commands
    Daemon {
        #[command(subcommand)]
        action: DaemonCommands,
    },
}

#[derive(Subcommand)]
enum VfdCommands {
    /// Show text on the display
    Set {
        /// Digits, '-', ' ' and '.' (e.g. "12.3")
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// Print the text currently on the display
    Show,
}

#[derive(Subcommand)]
enum NixieCommands {
    /// Power the tube
    Start,
    /// Remove power from the tube
    Stop,
    /// Write a raw run value (non-zero starts, zero stops)
    Run {
        /// Integer in decimal, 0x hex or leading-zero octal
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Show whether the tube is powered
    Status,
}

#[derive(Subcommand)]
enum DaemonCommands {
    /// Check if daemon is running
    Status,
    /// Request daemon shutdown
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = DaemonClient::connect_with_bus(cli.bus.into())
        .await
        .context("Failed to connect to daemon. Is nixiecaped running?")?;

    match cli.command {
        Commands::Vfd { action } => handle_vfd(action, &client).await,
        Commands::Nixie { action } => handle_nixie(action, &client).await,
        Commands::Daemon { action } => handle_daemon(action, &client).await,
    }
}

async fn handle_vfd(action: VfdCommands, client: &DaemonClient) -> Result<()> {
    match action {
        VfdCommands::Set { text } => {
            let written = client.set_display(&text).await?;
            debug!("Daemon consumed {} bytes", written);
            println!("Display set to: {}", text);
        }
        VfdCommands::Show => {
            // The daemon already terminates the text with a newline
            print!("{}", client.get_display().await?);
        }
    }
    Ok(())
}

async fn handle_nixie(action: NixieCommands, client: &DaemonClient) -> Result<()> {
    match action {
        NixieCommands::Start => {
            client.set_run("1").await?;
            println!("Nixie tube started");
        }
        NixieCommands::Stop => {
            client.set_run("0").await?;
            println!("Nixie tube stopped");
        }
        NixieCommands::Run { value } => {
            client.set_run(&value).await?;
            let running = client.is_running().await?;
            println!("Nixie tube {}", if running { "running" } else { "stopped" });
        }
        NixieCommands::Status => {
            let connected = client.is_nixie_connected().await?;
            let running = client.is_running().await?;
            println!("Nixie Status:");
            println!("  Connected: {}", if connected { "yes" } else { "no" });
            println!("  Running: {}", if running { "yes" } else { "no" });
        }
    }
    Ok(())
}

async fn handle_daemon(action: DaemonCommands, client: &DaemonClient) -> Result<()> {
    match action {
        DaemonCommands::Status => {
            let vfd = client.is_vfd_connected().await?;
            let nixie = client.is_nixie_connected().await?;
            println!("Daemon: running");
            println!("VFD connected: {}", if vfd { "yes" } else { "no" });
            println!("Nixie connected: {}", if nixie { "yes" } else { "no" });
        }
        DaemonCommands::Quit => {
            client.quit().await?;
            println!("Shutdown request sent to daemon");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_vfd_set() {
        let cli = Cli::try_parse_from(["nixiecapectl", "--bus", "system", "vfd", "set", "12.3"])
            .unwrap();
        assert!(matches!(cli.bus, CliBusType::System));
        match cli.command {
            Commands::Vfd {
                action: VfdCommands::Set { text },
            } => assert_eq!(text, "12.3"),
            _ => panic!("expected vfd set"),
        }
    }

    #[test]
    fn test_parse_negative_text() {
        let cli = Cli::try_parse_from(["nixiecapectl", "vfd", "set", "-12"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Vfd {
                action: VfdCommands::Set { ref text }
            } if text == "-12"
        ));
    }

    #[test]
    fn test_parse_nixie_run() {
        let cli = Cli::try_parse_from(["nixiecapectl", "-v", "nixie", "run", "0x1"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Nixie {
                action: NixieCommands::Run { ref value }
            } if value == "0x1"
        ));
    }

    #[test]
    fn test_rejects_unknown_bus() {
        assert!(Cli::try_parse_from(["nixiecapectl", "--bus", "tcp", "daemon", "status"]).is_err());
    }
}
