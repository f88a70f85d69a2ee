//! # Error Types
//!
//! Custom error types for the Chillout decoder using `thiserror`.
//!
//! Per-frame protocol problems are not errors: they are reported as
//! [`Diagnostic`](crate::protocol::decoder::Diagnostic) values and the decode
//! loop keeps going. Everything in here stops the program (or a single call).

use thiserror::Error;

/// Main error type for the Chillout decoder
#[derive(Debug, Error)]
pub enum DecoderError {
    /// Frame assembly errors
    #[error("Frame error: {0}")]
    Frame(String),

    /// CRC engine failed its start-up check
    #[error("CRC self-check failed for {variant}: got 0x{got:02X}, expected 0xF4")]
    SelfCheck {
        /// Variant under test
        variant: &'static str,
        /// Core register value produced for "123456789"
        got: u8,
    },

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// Capture file errors
    #[error("Capture error: {0}")]
    Capture(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Report serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the Chillout decoder
pub type Result<T> = std::result::Result<T, DecoderError>;
