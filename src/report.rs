//! # Reporter
//!
//! Renders decoder outcomes for a human watching the bus.
//!
//! Text output keeps the terse console style used while reverse engineering
//! the protocol:
//!
//! ```text
//! skip ff
//! !CRC got 0x85
//! 1:00080002078e00020000
//! mode off  set 4.4°C  coolant 19.34°C  compressor 0rpm
//! ```
//!
//! JSON output prints one object per outcome.

use std::fmt::Write as _;
use std::io::Write;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{ReportConfig, ReportFormat};
use crate::error::Result;
use crate::protocol::decoder::{CrcCheck, Diagnostic, ObservedFrame, Outcome};
use crate::protocol::frame::ADDRESS_REMOTE;
use crate::telemetry::remote::{known_command, RemoteCommand};

/// Outcome renderer writing to any output stream
#[derive(Debug)]
pub struct Reporter<W> {
    out: W,
    format: ReportFormat,
    show_raw: bool,
    show_diagnostics: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, config: &ReportConfig) -> Self {
        Self {
            out,
            format: config.format,
            show_raw: config.show_raw,
            show_diagnostics: config.show_diagnostics,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render one outcome
    ///
    /// Diagnostics are also logged, whether or not they are printed.
    ///
    /// # Errors
    ///
    /// Returns error if writing to the output fails
    pub fn report(&mut self, outcome: &Outcome) -> Result<()> {
        if let Outcome::Diagnostic(diagnostic) = outcome {
            log_diagnostic(diagnostic);
            if !self.show_diagnostics {
                return Ok(());
            }
        }

        match self.format {
            ReportFormat::Text => self.write_text(outcome),
            ReportFormat::Json => self.write_json(outcome),
        }
    }

    fn write_text(&mut self, outcome: &Outcome) -> Result<()> {
        match outcome {
            Outcome::Diagnostic(diagnostic) => {
                writeln!(self.out, "{}", diagnostic_line(diagnostic))?;
            }
            Outcome::RawFrameObserved(frame) => {
                if self.show_raw {
                    writeln!(self.out, "{}", raw_line(frame))?;
                }
                if frame.address == ADDRESS_REMOTE {
                    if let Some(command) = RemoteCommand::parse(&frame.payload) {
                        match known_command(&frame.payload) {
                            Some(label) => writeln!(self.out, "{}  [{}]", command, label)?,
                            None => writeln!(self.out, "{}", command)?,
                        }
                    }
                }
            }
            Outcome::Telemetry { telemetry, frame } => {
                if self.show_raw {
                    writeln!(self.out, "{}", raw_line(frame))?;
                }
                writeln!(self.out, "{}", telemetry)?;
            }
        }

        self.out.flush()?;
        Ok(())
    }

    fn write_json(&mut self, outcome: &Outcome) -> Result<()> {
        let time = chrono::Local::now().to_rfc3339();

        let value = match outcome {
            Outcome::Diagnostic(diagnostic) => json!({
                "time": time,
                "type": "diagnostic",
                "kind": diagnostic.kind(),
                "detail": diagnostic.to_string(),
            }),
            Outcome::RawFrameObserved(frame) => {
                let mut value = frame_json(frame, self.show_raw);
                value["time"] = json!(time);
                value["type"] = json!("frame");
                if frame.address == ADDRESS_REMOTE {
                    if let Some(command) = RemoteCommand::parse(&frame.payload) {
                        value["remote"] = serde_json::to_value(command)?;
                        value["command"] = json!(known_command(&frame.payload));
                    }
                }
                value
            }
            Outcome::Telemetry { telemetry, frame } => {
                let mut value = frame_json(frame, self.show_raw);
                value["time"] = json!(time);
                value["type"] = json!("telemetry");
                value["telemetry"] = serde_json::to_value(telemetry)?;
                value
            }
        };

        serde_json::to_writer(&mut self.out, &value)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    match diagnostic {
        // A desync per byte is normal while joining a busy bus
        Diagnostic::Desync { .. } => debug!("{}", diagnostic),
        _ => warn!("{}", diagnostic),
    }
}

fn diagnostic_line(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::Desync { byte } => format!("skip {:02x}", byte),
        Diagnostic::ShortFrame { length } => format!("!len {:02x}", length),
        Diagnostic::UnknownAddress { address } => format!("!addr {}", address),
        Diagnostic::ChecksumMismatch { actual, .. } => format!("!CRC got {:#x}", actual),
        Diagnostic::BadTerminator { terminator, .. } => format!("!frame2 {:02x}", terminator),
        Diagnostic::PayloadLayout { len, .. } => format!("!layout {} bytes", len),
        Diagnostic::EnumRange { field, index } => format!("!range {} {}", field, index),
    }
}

fn raw_line(frame: &ObservedFrame) -> String {
    format!("{}:{}", frame.address, hex(&frame.payload))
}

fn frame_json(frame: &ObservedFrame, with_payload: bool) -> Value {
    let mut value = json!({
        "address": frame.address,
        "crc_ok": frame.crc_ok(),
        "crc_evaluated": frame.crc != CrcCheck::NotEvaluated,
        "terminator_ok": frame.terminator_ok,
    });
    if with_payload {
        value["payload"] = json!(hex(&frame.payload));
    }
    value
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}
