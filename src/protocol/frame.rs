//! # Chillout Protocol Constants and Types
//!
//! Core wire definitions for the compressor / remote RS-485 bus.
//!
//! ```text
//! 0xC0  L  A  <payload: L-4 bytes>  C  0x01
//! ```

/// Frame sync byte (always 0xC0)
pub const SYNC_BYTE: u8 = 0xC0;

/// Frame terminator byte (always 0x01)
pub const TERMINATOR_BYTE: u8 = 0x01;

/// Smallest legal length byte (one payload byte)
pub const MIN_LENGTH_BYTE: u8 = 5;

/// Difference between the length byte and the payload length
pub const LENGTH_OVERHEAD: usize = 4;

/// Largest payload a length byte can describe
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize - LENGTH_OVERHEAD;

/// Compressor address (primary telemetry channel)
pub const ADDRESS_COMPRESSOR: u8 = 1;

/// Compressor address (alternate channel, payload layout unknown)
pub const ADDRESS_COMPRESSOR_ALT: u8 = 2;

/// Remote control address
pub const ADDRESS_REMOTE: u8 = 3;

/// Bus baud rate (Quantum v3; the 9600 baud units are not supported)
pub const BAUD_RATE: u32 = 115_200;

/// A frame as read off the wire, before any checksum validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Sender address
    pub address: u8,

    /// Payload data (`L - 4` bytes)
    pub payload: Vec<u8>,

    /// Checksum byte as received
    pub checksum: u8,

    /// Terminator byte as received
    pub terminator: u8,
}

impl RawFrame {
    /// Whether the terminator byte is the expected 0x01
    pub fn terminator_ok(&self) -> bool {
        self.terminator == TERMINATOR_BYTE
    }
}
