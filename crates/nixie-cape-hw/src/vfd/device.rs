//! VFD device: owns the frame buffer and keeps the display refreshed over SPI.

use crate::{Error, Result};
use embedded_hal::spi::SpiDevice;
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::SpidevDevice;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::VfdConfig;
use super::framebuffer::FrameBuffer;
use super::pins::PinMap;
use super::text::{decode_text, encode_text};

/// State shared between the write path and the refresher task.
struct Shared<S> {
    pins: PinMap,
    frame: RwLock<FrameBuffer>,
    bus: Mutex<S>,
    /// Signalled by every write to transmit immediately.
    rearm: Notify,
    interval: Duration,
}

impl<S: SpiDevice> Shared<S> {
    /// Transmits one refresh cycle, stopping at the first bus error.
    fn refresh(&self) -> Result<()> {
        let frames = self.frame.read().unwrap().snapshot_for_transmit();
        let Some((blanking, digits)) = frames.split_last() else {
            return Ok(());
        };

        let mut bus = self.bus.lock().unwrap();
        for frame in digits {
            bus.write(frame).map_err(|e| {
                warn!(
                    "cannot write vfd data: {:08x}: {:?}",
                    u32::from_be_bytes(*frame),
                    e
                );
                Error::Bus(format!("{:?}", e))
            })?;
        }
        bus.write(blanking).map_err(|e| {
            warn!("cannot write blanking data: {:?}", e);
            Error::Bus(format!("{:?}", e))
        })?;

        Ok(())
    }
}

/// Recurring refresh task.
///
/// Idle until the first write. Each write re-arms it at time zero, after
/// which it retransmits every `interval`. A failed cycle is dropped and
/// retried at the next interval.
async fn run_refresher<S: SpiDevice>(shared: Arc<Shared<S>>) {
    debug!("VFD refresher started ({:?} interval)", shared.interval);
    let mut armed = false;

    loop {
        if armed {
            tokio::select! {
                _ = shared.rearm.notified() => {}
                _ = tokio::time::sleep(shared.interval) => {}
            }
        } else {
            shared.rearm.notified().await;
            armed = true;
        }

        if let Err(e) = shared.refresh() {
            warn!("VFD refresh cycle aborted: {}", e);
        }
    }
}

/// VFD display controller.
///
/// Must be created inside a Tokio runtime; the refresher runs as a task on it.
pub struct VfdDevice<S> {
    shared: Arc<Shared<S>>,
    refresher: Option<JoinHandle<()>>,
}

/// Display on a Linux spidev node.
pub type SpidevVfd = VfdDevice<SpidevDevice>;

impl VfdDevice<SpidevDevice> {
    /// Opens a spidev node (mode 0, 8 bits per word) and creates the display.
    pub fn open(path: &str, speed_hz: u32, config: &VfdConfig) -> Result<Self> {
        let mut spi = SpidevDevice::open(path)
            .map_err(|e| Error::Bus(format!("cannot open {}: {:?}", path, e)))?;

        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options)?;

        info!("VFD SPI device opened at {} ({} Hz)", path, speed_hz);
        Self::new(config, spi)
    }
}

impl<S: SpiDevice + Send + 'static> VfdDevice<S> {
    /// Creates the display on an already opened SPI device.
    ///
    /// Fails if the hardware description is incomplete or inconsistent.
    pub fn new(config: &VfdConfig, spi: S) -> Result<Self> {
        let pins = PinMap::from_config(config)?;
        let interval = config.refresh_interval();
        let frame = FrameBuffer::new(pins.digit_count());

        info!(
            "VFD ready: {} digits, refresh every {}ms",
            pins.digit_count(),
            interval.as_millis()
        );

        let shared = Arc::new(Shared {
            pins,
            frame: RwLock::new(frame),
            bus: Mutex::new(spi),
            rearm: Notify::new(),
            interval,
        });
        let refresher = tokio::spawn(run_refresher(shared.clone()));

        Ok(Self {
            shared,
            refresher: Some(refresher),
        })
    }

    /// Replaces the displayed text.
    ///
    /// The buffer is rewritten and the refresher re-armed under one lock, so
    /// the next transmission always carries complete content. Returns the
    /// number of bytes consumed.
    pub fn write_display(&self, text: &str) -> Result<usize> {
        let mut frame = self.shared.frame.write().unwrap();
        let digits = encode_text(text, &self.shared.pins, &mut frame)?;
        self.shared.rearm.notify_one();

        debug!("VFD display set to {:?} ({} digits)", text, digits);
        Ok(text.len())
    }

    /// Reconstructs the displayed text, newline terminated.
    pub fn read_display(&self) -> String {
        let frame = self.shared.frame.read().unwrap();
        decode_text(&self.shared.pins, &frame)
    }

    /// Transmits one refresh cycle now.
    pub fn refresh(&self) -> Result<()> {
        self.shared.refresh()
    }

    /// Returns a copy of the frame words.
    pub fn frame_words(&self) -> Vec<u32> {
        self.shared.frame.read().unwrap().words().to_vec()
    }

    /// Returns the pin mapping.
    pub fn pins(&self) -> &PinMap {
        &self.shared.pins
    }

    /// Number of digits on the display.
    pub fn digit_count(&self) -> usize {
        self.shared.pins.digit_count()
    }

    /// Interval between refresh cycles.
    pub fn refresh_interval(&self) -> Duration {
        self.shared.interval
    }

    /// Stops the refresher and releases the display.
    ///
    /// Waits for an in-flight refresh cycle to finish before the frame
    /// buffer and SPI device are dropped.
    pub async fn shutdown(mut self) {
        if let Some(refresher) = self.refresher.take() {
            refresher.abort();
            let _ = refresher.await;
        }
        debug!("VFD refresher stopped");
    }
}

impl<S> Drop for VfdDevice<S> {
    fn drop(&mut self) {
        if let Some(refresher) = self.refresher.take() {
            refresher.abort();
        }
    }
}
