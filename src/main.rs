//! # Chillout Decoder
//!
//! Live feed of the RS-485 bus between a Chillout Quantum compressor and its
//! remote control.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (first argument, or `config/default.toml`)
//!    - Set up logging with tracing subscriber
//!    - Verify every CRC variant once
//!    - Open the serial port, or the capture file to replay
//!
//! 2. **Main Loop**
//!    - Decode and report frames on a blocking task
//!    - Handle Ctrl+C: the loop stops at the next frame boundary
//!
//! 3. **Shutdown**
//!    - Log decode statistics
//!
//! # Examples
//!
//! ```bash
//! cargo run --release -- config/default.toml
//! ```
//!
//! Expected output:
//! ```text
//! 1:00080002078e00020000
//! mode off  set 4.4°C  coolant 19.34°C  compressor 0rpm
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use chillout_decoder::config::{Config, LoggingConfig};
use chillout_decoder::monitor::{self, DecodeStats};
use chillout_decoder::protocol::crc;
use chillout_decoder::protocol::decoder::BusDecoder;
use chillout_decoder::report::Reporter;
use chillout_decoder::serial::capture::open_capture;
use chillout_decoder::serial::{ByteSource, SerialSource};

/// Prefix of rolling log file names
const LOG_FILE_PREFIX: &str = "chillout-decoder.log";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1);
    let config = Config::load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    let _log_guard = init_logging(&config.logging);

    info!("Chillout decoder v{} starting...", env!("CARGO_PKG_VERSION"));

    crc::verify_all()?;

    let shutdown = Arc::new(AtomicBool::new(false));

    let source: Box<dyn ByteSource + Send> = if config.capture.file.is_empty() {
        Box::new(SerialSource::open(&config.serial, Arc::clone(&shutdown))?)
    } else {
        Box::new(open_capture(&config.capture.file, config.capture.format)?)
    };

    info!("Press Ctrl+C to exit");

    let report_config = config.report.clone();
    let task_shutdown = Arc::clone(&shutdown);
    let mut decode_task = tokio::task::spawn_blocking(move || -> chillout_decoder::error::Result<DecodeStats> {
        let mut decoder = BusDecoder::new(source);
        let mut reporter = Reporter::new(io::stdout().lock(), &report_config);
        monitor::run(&mut decoder, &mut reporter, &task_shutdown)
    });

    let stats = tokio::select! {
        result = &mut decode_task => result??,

        // Handle Ctrl+C for graceful shutdown
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            shutdown.store(true, Ordering::Relaxed);
            decode_task.await??
        }
    };

    stats.log_summary();
    Ok(())
}

/// Console logging on stderr, plus daily rolling files when configured
///
/// The returned guard must be kept alive for file logs to be flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (file_layer, guard) = if config.dir.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Some(fmt::layer().with_ansi(false).with_writer(writer)),
            Some(guard),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_prefix() {
        assert!(LOG_FILE_PREFIX.starts_with(env!("CARGO_PKG_NAME")));
    }

    #[test]
    fn test_crc_variants_verify() {
        assert!(crc::verify_all().is_ok());
    }
}
