//! # Serial Communication Module
//!
//! Handles the receive side of the RS-485 bus.
//!
//! This module handles:
//! - Opening the serial port at 115,200 baud (8N1, no flow control)
//! - Blocking reads handed to the frame synchronizer
//! - Capture replay from files
//!
//! Nothing in here ever writes to the bus.

pub mod capture;
pub mod source;

pub use source::{ByteSource, ReaderSource};

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{DecoderError, Result};

/// Largest single read from the port
const READ_CHUNK_SIZE: usize = 64;

/// Bus listener on a serial port
///
/// Reads block for at most the configured timeout at a time. A timeout is
/// retried while the bus is idle; once `shutdown` is set it is reported as
/// end-of-stream instead so the decode loop can exit.
pub struct SerialSource<P = Box<dyn tokio_serial::SerialPort>> {
    /// Serial port handle
    port: P,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
    /// Bytes read from the port but not yet handed out
    buffer: BytesMut,
    /// Set when the process is shutting down
    shutdown: Arc<AtomicBool>,
}

impl<P> std::fmt::Debug for SerialSource<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialSource")
            .field("device_path", &self.device_path)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl SerialSource {
    /// Open the configured serial port
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use std::sync::atomic::AtomicBool;
    /// use chillout_decoder::config::SerialConfig;
    /// use chillout_decoder::serial::SerialSource;
    ///
    /// let config = SerialConfig::default();
    /// let source = SerialSource::open(&config, Arc::new(AtomicBool::new(false)))?;
    /// println!("Listening on {}", source.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(config: &SerialConfig, shutdown: Arc<AtomicBool>) -> Result<Self> {
        let port = Self::open_port(
            &config.port,
            config.baud_rate,
            Duration::from_millis(config.timeout_ms),
        )?;
        info!("Listening on {} at {} baud", config.port, config.baud_rate);

        Ok(Self::with_port(port, &config.port, shutdown))
    }

    /// Open a specific serial port with bus settings
    fn open_port(
        path: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Box<dyn tokio_serial::SerialPort>> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|e| DecoderError::Serial(format!("Failed to open {}: {}", path, e)))
    }
}

impl<P> SerialSource<P> {
    /// Wrap an already opened port
    pub fn with_port(port: P, device_path: &str, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            port,
            device_path: device_path.to_string(),
            buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            shutdown,
        }
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

impl<P: Read> ByteSource for SerialSource<P> {
    fn read_exact(&mut self, n: usize) -> io::Result<Option<Vec<u8>>> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        while self.buffer.len() < n {
            match self.port.read(&mut chunk) {
                Ok(0) => {
                    debug!("Serial port {} closed", self.device_path);
                    return Ok(None);
                }
                Ok(count) => self.buffer.extend_from_slice(&chunk[..count]),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {
                    if self.shutdown.load(Ordering::Relaxed) {
                        return Ok(None);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }

        Ok(Some(self.buffer.split_to(n).to_vec()))
    }
}
