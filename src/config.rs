//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{DecoderError, Result};
use crate::protocol::frame::BAUD_RATE;

/// Configuration file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub capture: CaptureConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Capture replay configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CaptureConfig {
    /// Capture file to replay; empty means listen on the serial port
    #[serde(default)]
    pub file: String,

    #[serde(default)]
    pub format: CaptureFormat,
}

/// On-disk capture encoding
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    /// Raw bytes as read from the port
    #[default]
    Binary,
    /// Hex digits, whitespace and `#` comments ignored
    Hex,
}

/// Console report configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,

    /// Print the raw payload of every frame
    #[serde(default = "default_true")]
    pub show_raw: bool,

    /// Print diagnostics (they are logged either way)
    #[serde(default = "default_true")]
    pub show_diagnostics: bool,
}

/// Console report format
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for daily rolling log files; empty disables file logging
    #[serde(default)]
    pub dir: String,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { BAUD_RATE }
fn default_timeout_ms() -> u64 { 100 }

fn default_true() -> bool { true }

fn default_log_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::default(),
            show_raw: default_true(),
            show_diagnostics: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: String::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use chillout_decoder::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given file, or the default file, or built-in defaults
    ///
    /// An explicitly given path must exist. The default path is optional.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        if self.capture.file.is_empty() && self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty when no capture file is set"));
        }

        // Only the 115200 baud Quantum v3 bus is supported
        if self.serial.baud_rate != BAUD_RATE {
            return Err(invalid(format!("baud_rate must be {}", BAUD_RATE)));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(invalid("timeout_ms must be between 1 and 10000"));
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("logging level must be one of: trace, debug, info, warn, error"));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> DecoderError {
    DecoderError::Config(toml::de::Error::custom(msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(toml_content: &str) -> Result<Config> {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        Config::load(temp_file.path())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.capture.format, CaptureFormat::Binary);
        assert_eq!(config.report.format, ReportFormat::Text);
        assert!(config.report.show_raw);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config: Config = toml::from_str(include_str!("../config/default.toml")).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let toml_content = r#"
[serial]
port = "/dev/ttyAMA0"

[capture]
file = "bus.hex"
format = "hex"

[report]
format = "json"
show_raw = false
"#;

        let config = load_str(toml_content).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyAMA0");
        assert_eq!(config.serial.timeout_ms, 100);
        assert_eq!(config.capture.file, "bus.hex");
        assert_eq!(config.capture.format, CaptureFormat::Hex);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert!(!config.report.show_raw);
        assert!(config.report.show_diagnostics);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = load_str("").unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
    }

    #[test]
    fn test_other_baud_rate_rejected() {
        let result = load_str("[serial]\nbaud_rate = 9600\n");
        match result {
            Err(DecoderError::Config(e)) => assert!(e.to_string().contains("baud_rate")),
            other => panic!("Expected Config error, got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = Config::default();
        config.serial.timeout_ms = 0;
        assert!(config.validate().is_err());

        config.serial.timeout_ms = 10001;
        assert!(config.validate().is_err());

        config.serial.timeout_ms = 10000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_port_needs_capture() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());

        config.capture.file = "bus.bin".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = load_str("[report]\nformat = \"xml\"\n");
        assert!(matches!(result, Err(DecoderError::Config(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/config.toml");
        assert!(matches!(result, Err(DecoderError::Io(_))));

        let result = Config::load_or_default(Some("/nonexistent/config.toml"));
        assert!(result.is_err());
    }
}
