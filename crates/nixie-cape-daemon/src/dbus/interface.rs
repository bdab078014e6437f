//! D-Bus interface implementation using zbus.
//!
//! Provides the `org.nixiecape.Daemon1` interface.

use std::sync::Arc;

use nixie_cape_hw::Error as HwError;
use tracing::{debug, info, warn};
use zbus::{interface, Connection};

use crate::config::DbusBusType;
use crate::state::AppState;

/// Maps a state error onto a D-Bus error, blaming the caller for bad input.
fn to_fdo_error(e: anyhow::Error) -> zbus::fdo::Error {
    match e.downcast_ref::<HwError>() {
        Some(HwError::Overflow { .. }) | Some(HwError::InvalidRunValue(_)) => {
            zbus::fdo::Error::InvalidArgs(e.to_string())
        }
        _ => zbus::fdo::Error::Failed(format!("{:#}", e)),
    }
}

/// D-Bus interface implementation for the nixie cape daemon.
pub struct Daemon1Interface {
    state: Arc<AppState>,
    shutdown_tx: tokio::sync::mpsc::Sender<()>,
}

impl Daemon1Interface {
    /// Creates a new D-Bus interface.
    pub fn new(state: Arc<AppState>, shutdown_tx: tokio::sync::mpsc::Sender<()>) -> Self {
        Self { state, shutdown_tx }
    }
}

#[interface(name = "org.nixiecape.Daemon1")]
impl Daemon1Interface {
    /// Replaces the VFD text. Returns the number of bytes consumed.
    fn set_display(&self, text: &str) -> zbus::fdo::Result<u32> {
        let written = self.state.write_display(text).map_err(to_fdo_error)?;

        debug!("D-Bus: SetDisplay({:?})", text);
        Ok(written as u32)
    }

    /// Gets the VFD text, newline terminated.
    fn get_display(&self) -> zbus::fdo::Result<String> {
        self.state.read_display().map_err(to_fdo_error)
    }

    /// Starts (non-zero) or stops (zero) the nixie tube.
    fn set_run(&self, value: &str) -> zbus::fdo::Result<()> {
        self.state.set_run(value).map_err(to_fdo_error)?;

        debug!("D-Bus: SetRun({:?})", value);
        Ok(())
    }

    /// Whether the nixie tube is powered.
    fn get_run(&self) -> bool {
        self.state.is_running()
    }

    /// Shuts down the daemon.
    async fn quit(&self) -> zbus::fdo::Result<()> {
        info!("D-Bus: Quit requested");
        self.shutdown_tx
            .send(())
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
        Ok(())
    }

    // Properties

    /// Whether the VFD is attached.
    #[zbus(property)]
    fn vfd_connected(&self) -> bool {
        self.state.is_vfd_connected()
    }

    /// Whether the nixie supply is attached.
    #[zbus(property)]
    fn nixie_connected(&self) -> bool {
        self.state.is_nixie_connected()
    }

    /// Whether the nixie tube is powered.
    #[zbus(property)]
    fn running(&self) -> bool {
        self.state.is_running()
    }
}

/// Connects to the appropriate D-Bus bus based on configuration.
async fn connect_to_bus(bus_type: DbusBusType) -> anyhow::Result<(Connection, &'static str)> {
    match bus_type {
        DbusBusType::Session => {
            let conn = Connection::session()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to session bus: {}", e))?;
            Ok((conn, "session"))
        }
        DbusBusType::System => {
            let conn = Connection::system()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to system bus: {}", e))?;
            Ok((conn, "system"))
        }
        DbusBusType::Auto => match Connection::session().await {
            Ok(conn) => Ok((conn, "session")),
            Err(session_err) => {
                warn!(
                    "Session bus unavailable ({}), trying system bus",
                    session_err
                );
                let conn = Connection::system().await.map_err(|system_err| {
                    anyhow::anyhow!(
                        "Failed to connect to any D-Bus: session={}, system={}",
                        session_err,
                        system_err
                    )
                })?;
                Ok((conn, "system"))
            }
        },
    }
}

/// Runs the D-Bus server.
pub async fn run_dbus_server(
    state: Arc<AppState>,
    shutdown_tx: tokio::sync::mpsc::Sender<()>,
    bus_type: DbusBusType,
) -> anyhow::Result<Connection> {
    let interface = Daemon1Interface::new(state, shutdown_tx);

    let (connection, bus_name) = connect_to_bus(bus_type).await?;

    connection
        .object_server()
        .at("/org/nixiecape/Daemon", interface)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to register object: {}", e))?;

    connection
        .request_name("org.nixiecape.Daemon")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to request bus name: {}", e))?;

    info!(
        "D-Bus service registered at org.nixiecape.Daemon on {} bus",
        bus_name
    );
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let overflow = anyhow::Error::from(HwError::Overflow {
            needed: 9,
            available: 8,
        });
        assert!(matches!(
            to_fdo_error(overflow),
            zbus::fdo::Error::InvalidArgs(_)
        ));

        let bad_run = anyhow::Error::from(HwError::InvalidRunValue("x".to_string()));
        assert!(matches!(
            to_fdo_error(bad_run),
            zbus::fdo::Error::InvalidArgs(_)
        ));

        let headless = anyhow::anyhow!("VFD not connected");
        match to_fdo_error(headless) {
            zbus::fdo::Error::Failed(msg) => assert_eq!(msg, "VFD not connected"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
