//! D-Bus client library for communicating with the nixie cape daemon.

use anyhow::{Context, Result};
use tracing::debug;
use zbus::names::BusName;
use zbus::{proxy, Connection};

/// Well-known bus name of the daemon.
pub const SERVICE_NAME: &str = "org.nixiecape.Daemon";

/// D-Bus bus type selection.
#[derive(Debug, Clone, Copy, Default)]
pub enum BusType {
    /// Session bus (user session).
    Session,
    /// System bus (system-wide).
    System,
    /// Try session first, fall back to system.
    #[default]
    Auto,
}

/// D-Bus proxy for the nixie cape daemon.
#[proxy(
    interface = "org.nixiecape.Daemon1",
    default_service = "org.nixiecape.Daemon",
    default_path = "/org/nixiecape/Daemon"
)]
trait Daemon1 {
    /// Replaces the VFD text. Returns the number of bytes consumed.
    fn set_display(&self, text: &str) -> zbus::Result<u32>;

    /// Gets the VFD text, newline terminated.
    fn get_display(&self) -> zbus::Result<String>;

    /// Starts (non-zero) or stops (zero) the nixie tube.
    fn set_run(&self, value: &str) -> zbus::Result<()>;

    /// Whether the nixie tube is powered.
    fn get_run(&self) -> zbus::Result<bool>;

    /// Shuts down the daemon.
    fn quit(&self) -> zbus::Result<()>;

    /// Whether the VFD is attached.
    #[zbus(property)]
    fn vfd_connected(&self) -> zbus::Result<bool>;

    /// Whether the nixie supply is attached.
    #[zbus(property)]
    fn nixie_connected(&self) -> zbus::Result<bool>;

    /// Whether the nixie tube is powered.
    #[zbus(property)]
    fn running(&self) -> zbus::Result<bool>;
}

/// D-Bus client wrapper for the daemon.
pub struct DaemonClient {
    proxy: Daemon1Proxy<'static>,
}

impl DaemonClient {
    /// Attempts to connect to the daemon via D-Bus with auto bus detection.
    pub async fn connect() -> Result<Self> {
        Self::connect_with_bus(BusType::Auto).await
    }

    /// Attempts to connect to the daemon via D-Bus with specified bus type.
    pub async fn connect_with_bus(bus_type: BusType) -> Result<Self> {
        let connection = match bus_type {
            BusType::Session => {
                debug!("Connecting to session bus");
                Connection::session()
                    .await
                    .context("Failed to connect to session bus")?
            }
            BusType::System => {
                debug!("Connecting to system bus");
                Connection::system()
                    .await
                    .context("Failed to connect to system bus")?
            }
            BusType::Auto => {
                // The session bus may be up without the daemon on it
                if let Ok(conn) = Connection::session().await {
                    if Self::service_exists(&conn).await {
                        debug!("Found daemon on session bus");
                        conn
                    } else {
                        debug!("Daemon not on session bus, trying system bus");
                        let sys_conn = Connection::system()
                            .await
                            .context("Failed to connect to system bus")?;
                        if !Self::service_exists(&sys_conn).await {
                            anyhow::bail!(
                                "Daemon service not found on session or system bus. Is nixiecaped running?"
                            );
                        }
                        debug!("Found daemon on system bus");
                        sys_conn
                    }
                } else {
                    debug!("Session bus unavailable, trying system bus");
                    Connection::system()
                        .await
                        .context("Failed to connect to any D-Bus")?
                }
            }
        };

        let proxy = Daemon1Proxy::new(&connection)
            .await
            .context("Failed to create D-Bus proxy")?;

        Ok(Self { proxy })
    }

    /// Checks if the daemon service exists on the given connection.
    async fn service_exists(conn: &Connection) -> bool {
        use zbus::fdo::DBusProxy;

        let Ok(name) = BusName::try_from(SERVICE_NAME) else {
            return false;
        };
        match DBusProxy::new(conn).await {
            Ok(dbus_proxy) => dbus_proxy.name_has_owner(name).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Replaces the VFD text.
    pub async fn set_display(&self, text: &str) -> Result<u32> {
        self.proxy
            .set_display(text)
            .await
            .context("Failed to set display via D-Bus")
    }

    /// Gets the VFD text.
    pub async fn get_display(&self) -> Result<String> {
        self.proxy
            .get_display()
            .await
            .context("Failed to get display via D-Bus")
    }

    /// Starts or stops the nixie tube.
    pub async fn set_run(&self, value: &str) -> Result<()> {
        self.proxy
            .set_run(value)
            .await
            .context("Failed to set nixie run state via D-Bus")
    }

    /// Checks if the nixie tube is powered.
    pub async fn is_running(&self) -> Result<bool> {
        self.proxy
            .get_run()
            .await
            .context("Failed to get nixie run state via D-Bus")
    }

    /// Requests daemon shutdown.
    pub async fn quit(&self) -> Result<()> {
        self.proxy
            .quit()
            .await
            .context("Failed to quit daemon via D-Bus")
    }

    /// Checks if the VFD is connected.
    pub async fn is_vfd_connected(&self) -> Result<bool> {
        self.proxy
            .vfd_connected()
            .await
            .context("Failed to get VFD status via D-Bus")
    }

    /// Checks if the nixie supply is connected.
    pub async fn is_nixie_connected(&self) -> Result<bool> {
        self.proxy
            .nixie_connected()
            .await
            .context("Failed to get nixie status via D-Bus")
    }
}
