//! # Bus Monitor
//!
//! Drives a [`BusDecoder`] into a [`Reporter`] until the stream ends or a
//! shutdown is requested.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::error::Result;
use crate::protocol::decoder::{BusDecoder, DiagnosticKind, Outcome};
use crate::report::Reporter;
use crate::serial::ByteSource;

/// Counters collected over one monitoring run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Structurally complete frames, including suspect ones
    pub frames: u64,
    /// Frames decoded into telemetry
    pub telemetry: u64,
    /// Diagnostics by kind
    pub diagnostics: BTreeMap<DiagnosticKind, u64>,
}

impl DecodeStats {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Telemetry { .. } => {
                self.frames += 1;
                self.telemetry += 1;
            }
            Outcome::RawFrameObserved(_) => self.frames += 1,
            Outcome::Diagnostic(diagnostic) => {
                *self.diagnostics.entry(diagnostic.kind()).or_insert(0) += 1;
            }
        }
    }

    pub fn diagnostic_count(&self, kind: DiagnosticKind) -> u64 {
        self.diagnostics.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_diagnostics(&self) -> u64 {
        self.diagnostics.values().sum()
    }

    /// Log a summary at info level
    pub fn log_summary(&self) {
        info!(
            "Decoded {} frames ({} telemetry), {} diagnostics",
            self.frames,
            self.telemetry,
            self.total_diagnostics()
        );
        for (kind, count) in &self.diagnostics {
            info!("  {}: {}", kind.as_str(), count);
        }
    }
}

/// Decode and report until end of stream or shutdown
///
/// `shutdown` is only honoured between frames, so a frame that has been read
/// is always reported in full.
///
/// # Errors
///
/// Returns error if the byte source fails or the report cannot be written
pub fn run<S, W>(
    decoder: &mut BusDecoder<S>,
    reporter: &mut Reporter<W>,
    shutdown: &AtomicBool,
) -> Result<DecodeStats>
where
    S: ByteSource,
    W: Write,
{
    let mut stats = DecodeStats::default();

    loop {
        if !decoder.has_pending() && shutdown.load(Ordering::Relaxed) {
            info!("Shutdown requested, stopping between frames");
            break;
        }

        let Some(outcome) = decoder.next_outcome()? else {
            info!("End of stream");
            break;
        };

        stats.record(&outcome);
        reporter.report(&outcome)?;
    }

    Ok(stats)
}
