//! # Bus Decoder
//!
//! Runs the synchronizer, checksum validation and field decoding over a byte
//! source and yields one [`Outcome`] at a time.
//!
//! Nothing here stops the stream: every protocol problem becomes a
//! [`Diagnostic`] and decoding carries on with the next frame.

use std::collections::VecDeque;
use std::io;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::crc::{compute, CrcVariant};
use super::frame::{RawFrame, ADDRESS_COMPRESSOR};
use super::sync::{FrameSynchronizer, SyncEvent};
use crate::serial::ByteSource;
use crate::telemetry::{FieldError, Telemetry};

/// Diagnostic category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Byte skipped while looking for a sync byte
    Desync,
    /// Length byte too small to hold a frame
    ShortFrame,
    /// Sender address with no checksum variant
    UnknownAddress,
    /// Received checksum differs from the computed one
    ChecksumMismatch,
    /// Last frame byte is not the terminator
    BadTerminator,
    /// Compressor payload of the wrong size
    PayloadLayout,
    /// Lookup index outside its table
    EnumRange,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::Desync => "desync",
            DiagnosticKind::ShortFrame => "short_frame",
            DiagnosticKind::UnknownAddress => "unknown_address",
            DiagnosticKind::ChecksumMismatch => "checksum_mismatch",
            DiagnosticKind::BadTerminator => "bad_terminator",
            DiagnosticKind::PayloadLayout => "payload_layout",
            DiagnosticKind::EnumRange => "enum_range",
        }
    }
}

/// Recoverable protocol problem seen on the bus
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// Non-sync byte consumed while seeking a frame start
    #[error("unexpected byte 0x{byte:02x} while seeking sync")]
    Desync {
        /// The skipped byte
        byte: u8,
    },

    /// Length byte below 5; only the sync and length bytes are consumed
    #[error("length byte {length} below minimum")]
    ShortFrame {
        /// Length byte as received
        length: u8,
    },

    /// Frame from an address outside 1..=3
    #[error("no checksum variant for address {address}")]
    UnknownAddress {
        /// Sender address as received
        address: u8,
    },

    /// Checksum byte does not match the payload
    #[error("address {address}: checksum 0x{actual:02x}, expected 0x{expected:02x}")]
    ChecksumMismatch {
        /// Sender address
        address: u8,
        /// Checksum computed over the payload
        expected: u8,
        /// Checksum byte as received
        actual: u8,
    },

    /// Frame ended with something other than 0x01
    #[error("address {address}: terminator 0x{terminator:02x}")]
    BadTerminator {
        /// Sender address
        address: u8,
        /// Terminator byte as received
        terminator: u8,
    },

    /// Compressor payload is not the telemetry layout size
    #[error("payload is {len} bytes, layout needs {expected}")]
    PayloadLayout {
        /// Payload size as received
        len: usize,
        /// Size the layout requires
        expected: usize,
    },

    /// Telemetry field index with no table entry
    #[error("{field} index {index} out of range")]
    EnumRange {
        /// Field name
        field: &'static str,
        /// Raw index from the payload
        index: u8,
    },
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::Desync { .. } => DiagnosticKind::Desync,
            Diagnostic::ShortFrame { .. } => DiagnosticKind::ShortFrame,
            Diagnostic::UnknownAddress { .. } => DiagnosticKind::UnknownAddress,
            Diagnostic::ChecksumMismatch { .. } => DiagnosticKind::ChecksumMismatch,
            Diagnostic::BadTerminator { .. } => DiagnosticKind::BadTerminator,
            Diagnostic::PayloadLayout { .. } => DiagnosticKind::PayloadLayout,
            Diagnostic::EnumRange { .. } => DiagnosticKind::EnumRange,
        }
    }
}

impl From<FieldError> for Diagnostic {
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::PayloadLayout { len, expected } => Diagnostic::PayloadLayout { len, expected },
            FieldError::EnumRange { field, index } => Diagnostic::EnumRange { field, index },
        }
    }
}

/// Result of checksum validation for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrcCheck {
    /// Received checksum matches
    Valid,
    /// Received checksum differs
    Mismatch {
        /// Checksum computed over the payload
        expected: u8,
        /// Checksum byte as received
        actual: u8,
    },
    /// Unknown sender, no variant to check with
    NotEvaluated,
}

/// A structurally complete frame as handed to the reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedFrame {
    /// Sender address
    pub address: u8,
    /// Payload bytes, undecoded
    pub payload: Vec<u8>,
    /// Checksum byte as received
    pub checksum: u8,
    /// Checksum validation result
    pub crc: CrcCheck,
    /// Whether the frame ended with 0x01
    pub terminator_ok: bool,
}

impl ObservedFrame {
    pub fn crc_ok(&self) -> bool {
        self.crc == CrcCheck::Valid
    }
}

/// One item of decoder output
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Compressor frame decoded into telemetry
    Telemetry {
        telemetry: Telemetry,
        frame: ObservedFrame,
    },

    /// Any other structurally complete frame
    RawFrameObserved(ObservedFrame),

    /// Protocol problem
    Diagnostic(Diagnostic),
}

/// Validate a frame and decode its payload
///
/// Diagnostics come first, followed by exactly one frame outcome. A failed
/// checksum or terminator does not stop the payload from being decoded.
pub fn process_frame(raw: RawFrame) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(2);
    let terminator_ok = raw.terminator_ok();

    if !terminator_ok {
        outcomes.push(Outcome::Diagnostic(Diagnostic::BadTerminator {
            address: raw.address,
            terminator: raw.terminator,
        }));
    }

    let crc = match CrcVariant::for_address(raw.address) {
        Some(variant) => {
            let expected = compute(variant, &raw.payload);
            if expected == raw.checksum {
                CrcCheck::Valid
            } else {
                outcomes.push(Outcome::Diagnostic(Diagnostic::ChecksumMismatch {
                    address: raw.address,
                    expected,
                    actual: raw.checksum,
                }));
                CrcCheck::Mismatch {
                    expected,
                    actual: raw.checksum,
                }
            }
        }
        None => {
            outcomes.push(Outcome::Diagnostic(Diagnostic::UnknownAddress {
                address: raw.address,
            }));
            CrcCheck::NotEvaluated
        }
    };

    let frame = ObservedFrame {
        address: raw.address,
        payload: raw.payload,
        checksum: raw.checksum,
        crc,
        terminator_ok,
    };

    if frame.address != ADDRESS_COMPRESSOR {
        outcomes.push(Outcome::RawFrameObserved(frame));
        return outcomes;
    }

    match Telemetry::decode(&frame.payload) {
        Ok(telemetry) => outcomes.push(Outcome::Telemetry { telemetry, frame }),
        Err(err) => {
            outcomes.push(Outcome::Diagnostic(err.into()));
            outcomes.push(Outcome::RawFrameObserved(frame));
        }
    }

    outcomes
}

/// Decoder over a byte source
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use chillout_decoder::protocol::decoder::{BusDecoder, Outcome};
/// use chillout_decoder::serial::ReaderSource;
///
/// let bytes = vec![
///     0xC0, 0x0E, 0x01, 0x00, 0x08, 0x00, 0x02, 0x07, 0x8E, 0x00, 0x02, 0x00, 0x00, 0x84, 0x01,
/// ];
/// let mut decoder = BusDecoder::new(ReaderSource::new(Cursor::new(bytes)));
///
/// let outcome = decoder.next_outcome()?;
/// assert!(matches!(outcome, Some(Outcome::Telemetry { .. })));
/// assert_eq!(decoder.next_outcome()?, None);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct BusDecoder<S> {
    sync: FrameSynchronizer<S>,
    pending: VecDeque<Outcome>,
}

impl<S: ByteSource> BusDecoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            sync: FrameSynchronizer::new(source),
            pending: VecDeque::new(),
        }
    }

    /// Whether outcomes of an already-read frame are still queued
    ///
    /// When this is false the stream is positioned between frames.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Next outcome, or `None` at end of stream
    ///
    /// # Errors
    ///
    /// Returns the byte source's I/O error, if any
    pub fn next_outcome(&mut self) -> io::Result<Option<Outcome>> {
        if let Some(outcome) = self.pending.pop_front() {
            return Ok(Some(outcome));
        }

        let Some(event) = self.sync.next_event()? else {
            return Ok(None);
        };

        let outcome = match event {
            SyncEvent::Desync(byte) => Outcome::Diagnostic(Diagnostic::Desync { byte }),
            SyncEvent::ShortFrame(length) => Outcome::Diagnostic(Diagnostic::ShortFrame { length }),
            SyncEvent::Frame(raw) => {
                debug!("Frame from address {}: {} payload bytes", raw.address, raw.payload.len());
                self.pending.extend(process_frame(raw));
                // process_frame always yields a frame outcome
                match self.pending.pop_front() {
                    Some(outcome) => outcome,
                    None => return Ok(None),
                }
            }
        };

        Ok(Some(outcome))
    }
}

impl<S: ByteSource> Iterator for BusDecoder<S> {
    type Item = io::Result<Outcome>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_outcome().transpose()
    }
}
