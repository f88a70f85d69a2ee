//! # CRC-8 Implementation
//!
//! CRC-8 checksum used on the Chillout bus.
//!
//! **Polynomial**: 0x07 (x^8 + x^2 + x + 1)
//! **Initial Value**: 0x00
//! **Reflection**: none
//! **Output XOR**: per sender address (see [`CrcVariant`])
//!
//! The register is the plain CRC-8/SMBUS one. Every sender finishes it with its
//! own XOR constant, which is what makes the variants differ.

use crate::error::{DecoderError, Result};

use super::frame::{ADDRESS_COMPRESSOR, ADDRESS_COMPRESSOR_ALT, ADDRESS_REMOTE};

/// CRC-8 polynomial
const CRC8_POLY: u8 = 0x07;

/// Initial register value
const CRC8_INIT: u8 = 0x00;

/// Check input shared by all CRC catalogues
pub const CHECK_INPUT: &[u8] = b"123456789";

/// Core register value for [`CHECK_INPUT`], before the output XOR
pub const CHECK_VALUE: u8 = 0xF4;

/// Precomputed CRC8 lookup table for fast calculation
const CRC8_TABLE: [u8; 256] = generate_crc8_table();

/// Generate CRC8 lookup table at compile time
const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u8;
        let mut j = 0;

        while j < 8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Checksum parameterization, one per known sender address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrcVariant {
    /// Address 1, compressor telemetry
    Compressor,
    /// Address 2, compressor alternate channel
    CompressorAlt,
    /// Address 3, remote control
    Remote,
}

impl CrcVariant {
    /// All variants, in address order
    pub const ALL: [CrcVariant; 3] = [
        CrcVariant::Compressor,
        CrcVariant::CompressorAlt,
        CrcVariant::Remote,
    ];

    /// Select the variant bound to a sender address
    ///
    /// Returns `None` for addresses with no known checksum.
    pub const fn for_address(address: u8) -> Option<Self> {
        match address {
            ADDRESS_COMPRESSOR => Some(CrcVariant::Compressor),
            ADDRESS_COMPRESSOR_ALT => Some(CrcVariant::CompressorAlt),
            ADDRESS_REMOTE => Some(CrcVariant::Remote),
            _ => None,
        }
    }

    /// Sender address this variant is bound to
    pub const fn address(self) -> u8 {
        match self {
            CrcVariant::Compressor => ADDRESS_COMPRESSOR,
            CrcVariant::CompressorAlt => ADDRESS_COMPRESSOR_ALT,
            CrcVariant::Remote => ADDRESS_REMOTE,
        }
    }

    /// Output XOR applied after the register is computed
    pub const fn xor_out(self) -> u8 {
        match self {
            CrcVariant::Compressor => 0x30,
            CrcVariant::CompressorAlt => 0xEA,
            CrcVariant::Remote => 0xE9,
        }
    }

    /// Human-readable name, used in logs and errors
    pub const fn name(self) -> &'static str {
        match self {
            CrcVariant::Compressor => "compressor",
            CrcVariant::CompressorAlt => "compressor-alt",
            CrcVariant::Remote => "remote",
        }
    }

    /// Verify the variant's register against the catalogue check value
    ///
    /// The output XOR is not part of the check; see the module docs.
    ///
    /// # Errors
    ///
    /// Returns [`DecoderError::SelfCheck`] if the register does not produce
    /// [`CHECK_VALUE`] for [`CHECK_INPUT`].
    pub fn self_check(self) -> Result<()> {
        let got = compute(self, CHECK_INPUT) ^ self.xor_out();
        if got != CHECK_VALUE {
            return Err(DecoderError::SelfCheck {
                variant: self.name(),
                got,
            });
        }
        Ok(())
    }
}

/// Run [`CrcVariant::self_check`] for every variant
///
/// Meant to be called once at start-up, never per frame.
pub fn verify_all() -> Result<()> {
    for variant in CrcVariant::ALL {
        variant.self_check()?;
    }
    Ok(())
}

/// Calculate the bus checksum of `data` for a given variant
///
/// # Arguments
///
/// * `variant` - Checksum variant selected by sender address
/// * `data` - Frame payload (the checksum never covers header bytes)
///
/// # Returns
///
/// * `u8` - Calculated checksum, output XOR applied
///
/// # Examples
///
/// ```
/// use chillout_decoder::protocol::crc::{compute, CrcVariant};
///
/// let payload = [0x00, 0x08, 0x00, 0x02, 0x07, 0x8E, 0x00, 0x02, 0x00, 0x00];
/// assert_eq!(compute(CrcVariant::Compressor, &payload), 0x84);
/// ```
pub fn compute(variant: CrcVariant, data: &[u8]) -> u8 {
    let mut crc: u8 = CRC8_INIT;

    for &byte in data {
        crc = CRC8_TABLE[(crc ^ byte) as usize];
    }

    crc ^ variant.xor_out()
}

/// Calculate the CRC8 register using the direct algorithm (slow, for verification)
#[cfg(test)]
fn crc8_slow(data: &[u8]) -> u8 {
    let mut crc: u8 = CRC8_INIT;

    for &byte in data {
        crc ^= byte;

        for _ in 0..8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
        }
    }

    crc
}
