//! # Frame Assembler
//!
//! Builds complete frames from an address and payload. The decoder never
//! transmits; assembled frames are used to recognise known commands on the bus
//! and to build test streams.

use super::crc::{compute, CrcVariant};
use super::frame::*;
use crate::error::{DecoderError, Result};

/// Assemble a complete frame
///
/// # Arguments
///
/// * `address` - Sender address (1, 2 or 3)
/// * `payload` - Payload data (1..=251 bytes)
///
/// # Returns
///
/// * `Result<Vec<u8>>` - Sync + length + address + payload + CRC + terminator
///
/// # Errors
///
/// Returns error if the address has no checksum variant or the payload length
/// cannot be expressed in the length byte.
///
/// # Examples
///
/// ```
/// use chillout_decoder::protocol::encoder::encode_frame;
///
/// // Remote "on" command
/// let frame = encode_frame(3, &[0x03, 0x00, 0x0A, 0x00])?;
/// assert_eq!(frame, [0xC0, 0x08, 0x03, 0x03, 0x00, 0x0A, 0x00, 0x51, 0x01]);
/// # Ok::<(), chillout_decoder::error::DecoderError>(())
/// ```
pub fn encode_frame(address: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let variant = CrcVariant::for_address(address).ok_or_else(|| {
        DecoderError::Frame(format!("No checksum variant for address {}", address))
    })?;

    if payload.is_empty() || payload.len() > MAX_PAYLOAD_SIZE {
        return Err(DecoderError::Frame(format!(
            "Payload size {} outside 1..={}",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = Vec::with_capacity(payload.len() + LENGTH_OVERHEAD + 2);
    frame.push(SYNC_BYTE);
    frame.push((payload.len() + LENGTH_OVERHEAD) as u8);
    frame.push(address);
    frame.extend_from_slice(payload);
    frame.push(compute(variant, payload));
    frame.push(TERMINATOR_BYTE);

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::remote::KNOWN_COMMANDS;

    /// Command frames as stored in the interface firmware
    const FIRMWARE_COMMANDS: [[u8; 9]; 12] = [
        [0xC0, 0x08, 0x03, 0x00, 0x00, 0x0A, 0x00, 0x6B, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x0A, 0x00, 0x51, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x01, 0x01, 0xC1, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x02, 0x01, 0xFE, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x03, 0x01, 0xEB, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x04, 0x01, 0x80, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x05, 0x01, 0x95, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x06, 0x01, 0xAA, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x07, 0x01, 0xBF, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x08, 0x01, 0x7C, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x09, 0x01, 0x69, 0x01],
        [0xC0, 0x08, 0x03, 0x03, 0x00, 0x0A, 0x01, 0x56, 0x01],
    ];

    #[test]
    fn test_encode_captured_compressor_frame() {
        let payload = [0x00, 0x08, 0x00, 0x02, 0x07, 0x8E, 0x00, 0x02, 0x00, 0x00];
        let frame = encode_frame(ADDRESS_COMPRESSOR, &payload).unwrap();

        assert_eq!(
            frame,
            vec![0xC0, 0x0E, 0x01, 0x00, 0x08, 0x00, 0x02, 0x07, 0x8E, 0x00, 0x02, 0x00, 0x00, 0x84, 0x01]
        );
    }

    #[test]
    fn test_known_commands_match_firmware_table() {
        for (label, payload) in KNOWN_COMMANDS.iter() {
            let frame = encode_frame(ADDRESS_REMOTE, payload).unwrap();
            assert!(
                FIRMWARE_COMMANDS.iter().any(|known| known.as_slice() == frame.as_slice()),
                "{} encodes to {:02X?}, not in firmware table",
                label,
                frame
            );
        }
    }

    #[test]
    fn test_frame_structure() {
        let frame = encode_frame(ADDRESS_COMPRESSOR_ALT, &[0x11, 0x22]).unwrap();

        assert_eq!(frame.len(), 7);
        assert_eq!(frame[0], SYNC_BYTE);
        assert_eq!(frame[1], 6);
        assert_eq!(frame[2], ADDRESS_COMPRESSOR_ALT);
        assert_eq!(frame[6], TERMINATOR_BYTE);
    }

    #[test]
    fn test_unknown_address_rejected() {
        let result = encode_frame(9, &[0x00]);
        assert!(matches!(result, Err(DecoderError::Frame(_))));
    }

    #[test]
    fn test_payload_size_limits() {
        assert!(encode_frame(ADDRESS_REMOTE, &[]).is_err());
        assert!(encode_frame(ADDRESS_REMOTE, &[0u8; MAX_PAYLOAD_SIZE]).is_ok());
        assert!(encode_frame(ADDRESS_REMOTE, &[0u8; MAX_PAYLOAD_SIZE + 1]).is_err());
    }
}
