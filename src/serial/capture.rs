//! Replay of recorded bus traffic
//!
//! Captures are either raw bytes as they came off the port, or hex text in the
//! form the diagnostic console prints (`c00e0100080002078e000200008401`).

use std::fs;
use std::io::Cursor;
use std::path::Path;

use tracing::info;

use super::source::ReaderSource;
use crate::config::CaptureFormat;
use crate::error::{DecoderError, Result};

/// Open a capture file as a byte source
///
/// The whole file is loaded up front; captures are small.
///
/// # Errors
///
/// Returns error if the file cannot be read or a hex capture is malformed.
pub fn open_capture<P: AsRef<Path>>(
    path: P,
    format: CaptureFormat,
) -> Result<ReaderSource<Cursor<Vec<u8>>>> {
    let path = path.as_ref();
    let bytes = match format {
        CaptureFormat::Binary => fs::read(path)?,
        CaptureFormat::Hex => parse_hex(&fs::read_to_string(path)?)?,
    };

    info!("Replaying {} bytes from {}", bytes.len(), path.display());
    Ok(ReaderSource::new(Cursor::new(bytes)))
}

/// Parse hex text into bytes
///
/// Whitespace is ignored and `#` starts a comment running to end of line.
/// Digit pairs may be contiguous or separated.
///
/// # Errors
///
/// Returns [`DecoderError::Capture`] on a non-hex character or an odd number
/// of digits.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut high: Option<u8> = None;

    for (line_no, line) in text.lines().enumerate() {
        let data = line.split('#').next().unwrap_or_default();

        for c in data.chars().filter(|c| !c.is_whitespace()) {
            let nibble = c.to_digit(16).ok_or_else(|| {
                DecoderError::Capture(format!("invalid hex digit '{}' on line {}", c, line_no + 1))
            })? as u8;

            match high.take() {
                Some(h) => bytes.push((h << 4) | nibble),
                None => high = Some(nibble),
            }
        }
    }

    if high.is_some() {
        return Err(DecoderError::Capture("odd number of hex digits".to_string()));
    }

    Ok(bytes)
}
