//! D-Bus interface for the nixie cape daemon.
//!
//! Provides the `org.nixiecape.Daemon1` interface on the session or system bus.

mod interface;

pub use interface::run_dbus_server;
