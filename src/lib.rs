//! # Chillout Decoder Library
//!
//! Decode the RS-485 bus between a Chillout Quantum compressor and its remote
//! control.
//!
//! This library turns a raw byte stream into validated frames and typed
//! compressor telemetry, reporting every framing or checksum problem as a
//! diagnostic instead of stopping.

pub mod config;
pub mod error;
pub mod monitor;
pub mod protocol;
pub mod report;
pub mod serial;
pub mod telemetry;
