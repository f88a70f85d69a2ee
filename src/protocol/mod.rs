//! # Chillout Protocol Module
//!
//! Receive side of the compressor / remote control RS-485 protocol.
//!
//! This module handles:
//! - Frame synchronization and resynchronization after corruption
//! - Per-address CRC-8 checksum validation
//! - Routing compressor frames to the telemetry decoder
//! - Frame assembly for known commands and tests

pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod sync;
