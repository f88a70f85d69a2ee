//! # Telemetry Module
//!
//! Typed views of frame payloads.
//!
//! This module handles:
//! - Decoding compressor (address 1) payloads into [`Telemetry`]
//! - The power-mode and set-temperature lookup tables
//! - An informational view of remote control payloads ([`remote`])

pub mod remote;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Compressor payload size (address 1)
pub const COMPRESSOR_PAYLOAD_SIZE: usize = 10;

/// Power mode by index.
///
/// Index 2 reads as off too; the unit sends it when switched off while in
/// max mode.
pub const POWER_MODES: [PowerMode; 4] = [PowerMode::Off, PowerMode::Eco, PowerMode::Off, PowerMode::Max];

/// Calibrated set temperatures in °C by index
pub const SET_TEMPERATURES: [f32; 11] = [0.0, 1.3, 4.4, 7.2, 10.0, 12.7, 15.5, 18.3, 21.1, 23.9, 26.7];

/// Fixed-width field inside a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Field {
    name: &'static str,
    offset: usize,
    width: usize,
}

// Compressor payload layout, big-endian:
//
//   PP xx xx TT CCCC xx xx RRRR
const POWER_MODE: Field = Field { name: "power_mode", offset: 0, width: 1 };
const SET_TEMPERATURE: Field = Field { name: "set_temperature", offset: 3, width: 1 };
const COOLANT_TEMPERATURE: Field = Field { name: "coolant_temperature", offset: 4, width: 2 };
const COMPRESSOR_SPEED: Field = Field { name: "compressor_speed_rpm", offset: 8, width: 2 };

/// Payload could not be turned into a typed record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Payload length does not match the fixed layout
    #[error("payload is {len} bytes, layout needs {expected}")]
    PayloadLayout {
        /// Received payload length
        len: usize,
        /// Length the layout requires
        expected: usize,
    },

    /// Table index outside its lookup table
    #[error("{field} index {index} out of range")]
    EnumRange {
        /// Field name
        field: &'static str,
        /// Raw index
        index: u8,
    },
}

/// Compressor power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerMode {
    /// Compressor off
    Off,
    /// Reduced-power mode
    Eco,
    /// Full-power mode
    Max,
}

impl PowerMode {
    /// Look up a power mode by its wire index
    pub fn from_index(index: u8) -> Option<Self> {
        POWER_MODES.get(index as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerMode::Off => "off",
            PowerMode::Eco => "eco",
            PowerMode::Max => "max",
        }
    }
}

impl fmt::Display for PowerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Look up a calibrated set temperature (°C) by its wire index
pub fn set_temperature_for_index(index: u8) -> Option<f32> {
    SET_TEMPERATURES.get(index as usize).copied()
}

/// Compressor telemetry record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    /// Current power mode
    pub power_mode: PowerMode,

    /// Set temperature in °C
    pub set_temperature: f32,

    /// Coolant temperature in °C
    pub coolant_temperature: f32,

    /// Compressor speed in rpm
    pub compressor_speed_rpm: u16,
}

impl Telemetry {
    /// Decode a compressor payload
    ///
    /// # Arguments
    ///
    /// * `payload` - Address 1 payload (10 bytes)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Payload is not exactly 10 bytes
    /// - Power mode or set temperature index is outside its table
    ///
    /// # Examples
    ///
    /// ```
    /// use chillout_decoder::telemetry::{PowerMode, Telemetry};
    ///
    /// let payload = [0x00, 0x08, 0x00, 0x02, 0x07, 0x8E, 0x00, 0x02, 0x00, 0x00];
    /// let telemetry = Telemetry::decode(&payload)?;
    /// assert_eq!(telemetry.power_mode, PowerMode::Off);
    /// assert_eq!(telemetry.compressor_speed_rpm, 0);
    /// # Ok::<(), chillout_decoder::telemetry::FieldError>(())
    /// ```
    pub fn decode(payload: &[u8]) -> Result<Self, FieldError> {
        if payload.len() != COMPRESSOR_PAYLOAD_SIZE {
            return Err(FieldError::PayloadLayout {
                len: payload.len(),
                expected: COMPRESSOR_PAYLOAD_SIZE,
            });
        }

        let mode_index = read_u8(payload, POWER_MODE)?;
        let power_mode = PowerMode::from_index(mode_index).ok_or(FieldError::EnumRange {
            field: POWER_MODE.name,
            index: mode_index,
        })?;

        let set_index = read_u8(payload, SET_TEMPERATURE)?;
        let set_temperature = set_temperature_for_index(set_index).ok_or(FieldError::EnumRange {
            field: SET_TEMPERATURE.name,
            index: set_index,
        })?;

        // Hundredths of a degree
        let coolant_cdeg = read_u16_be(payload, COOLANT_TEMPERATURE)?;
        let coolant_temperature = coolant_cdeg as f32 / 100.0;

        let compressor_speed_rpm = read_u16_be(payload, COMPRESSOR_SPEED)?;

        Ok(Telemetry {
            power_mode,
            set_temperature,
            coolant_temperature,
            compressor_speed_rpm,
        })
    }
}

/// Temperatures print in shortest form with at least one decimal
/// (`19.3`, `19.34`, `20.0`), matching the console tool's output.
impl fmt::Display for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode {}  set {:?}°C  coolant {:?}°C  compressor {}rpm",
            self.power_mode, self.set_temperature, self.coolant_temperature, self.compressor_speed_rpm
        )
    }
}

fn field_bytes<'a>(payload: &'a [u8], field: Field) -> Result<&'a [u8], FieldError> {
    payload
        .get(field.offset..field.offset + field.width)
        .ok_or(FieldError::PayloadLayout {
            len: payload.len(),
            expected: COMPRESSOR_PAYLOAD_SIZE,
        })
}

fn read_u8(payload: &[u8], field: Field) -> Result<u8, FieldError> {
    debug_assert_eq!(field.width, 1);
    Ok(field_bytes(payload, field)?[0])
}

fn read_u16_be(payload: &[u8], field: Field) -> Result<u16, FieldError> {
    debug_assert_eq!(field.width, 2);
    let bytes = field_bytes(payload, field)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}
