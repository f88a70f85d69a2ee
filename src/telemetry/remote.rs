//! Remote control payloads (address 3)
//!
//! The remote sends `PP xx TT MM`: power mode, a reserved byte, the level
//! (set-temperature index, 1 = most cooling, 10 = least) and a flag telling
//! which of the two it just changed. Nothing here is turned into
//! [`Telemetry`](super::Telemetry); it only helps a human read the feed.

use std::fmt;

use serde::Serialize;

use super::PowerMode;

/// Remote payload size (address 3)
pub const REMOTE_PAYLOAD_SIZE: usize = 4;

/// Payloads of the commands the interface firmware knows how to send
pub const KNOWN_COMMANDS: [(&str, [u8; REMOTE_PAYLOAD_SIZE]); 12] = [
    ("off", [0x00, 0x00, 0x0A, 0x00]),
    ("on", [0x03, 0x00, 0x0A, 0x00]),
    ("set 1", [0x03, 0x00, 0x01, 0x01]),
    ("set 2", [0x03, 0x00, 0x02, 0x01]),
    ("set 3", [0x03, 0x00, 0x03, 0x01]),
    ("set 4", [0x03, 0x00, 0x04, 0x01]),
    ("set 5", [0x03, 0x00, 0x05, 0x01]),
    ("set 6", [0x03, 0x00, 0x06, 0x01]),
    ("set 7", [0x03, 0x00, 0x07, 0x01]),
    ("set 8", [0x03, 0x00, 0x08, 0x01]),
    ("set 9", [0x03, 0x00, 0x09, 0x01]),
    ("set 10", [0x03, 0x00, 0x0A, 0x01]),
];

/// What the remote user just changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Power mode button pressed
    PowerMode,
    /// Temperature level changed
    Temperature,
    /// Unrecognised change flag
    Other(u8),
}

impl From<u8> for ChangeKind {
    fn from(flag: u8) -> Self {
        match flag {
            0x00 => ChangeKind::PowerMode,
            0x01 => ChangeKind::Temperature,
            other => ChangeKind::Other(other),
        }
    }
}

/// Informational view of a remote control payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemoteCommand {
    /// Requested power mode
    pub power_mode: PowerMode,
    /// Temperature level index
    pub level: u8,
    /// What triggered this command
    pub change: ChangeKind,
}

impl RemoteCommand {
    /// Interpret a remote payload
    ///
    /// Returns `None` for payloads of the wrong size or with an unknown power
    /// mode. Those are still shown as raw bytes.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let &[mode, _, level, flag] = payload else {
            return None;
        };

        Some(RemoteCommand {
            power_mode: PowerMode::from_index(mode)?,
            level,
            change: ChangeKind::from(flag),
        })
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote mode {}  level {}", self.power_mode, self.level)?;
        match self.change {
            ChangeKind::PowerMode => f.write_str("  (mode changed)"),
            ChangeKind::Temperature => f.write_str("  (level changed)"),
            ChangeKind::Other(flag) => write!(f, "  (flag 0x{:02x})", flag),
        }
    }
}

/// Name of a known firmware command with this payload, if any
pub fn known_command(payload: &[u8]) -> Option<&'static str> {
    KNOWN_COMMANDS
        .iter()
        .find(|(_, known)| known.as_slice() == payload)
        .map(|(label, _)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_change() {
        let command = RemoteCommand::parse(&[0x03, 0x00, 0x05, 0x01]).unwrap();
        assert_eq!(command.power_mode, PowerMode::Max);
        assert_eq!(command.level, 5);
        assert_eq!(command.change, ChangeKind::Temperature);
        assert_eq!(command.to_string(), "remote mode max  level 5  (level changed)");
    }

    #[test]
    fn test_parse_power_change() {
        let command = RemoteCommand::parse(&[0x01, 0x00, 0x0A, 0x00]).unwrap();
        assert_eq!(command.power_mode, PowerMode::Eco);
        assert_eq!(command.change, ChangeKind::PowerMode);
    }

    #[test]
    fn test_parse_unknown_flag() {
        let command = RemoteCommand::parse(&[0x00, 0x00, 0x01, 0x07]).unwrap();
        assert_eq!(command.change, ChangeKind::Other(0x07));
        assert!(command.to_string().ends_with("(flag 0x07)"));
    }

    #[test]
    fn test_parse_rejects_bad_payloads() {
        assert_eq!(RemoteCommand::parse(&[0x03, 0x00, 0x05]), None);
        assert_eq!(RemoteCommand::parse(&[0x03, 0x00, 0x05, 0x01, 0x00]), None);
        assert_eq!(RemoteCommand::parse(&[0x09, 0x00, 0x05, 0x01]), None);
    }

    #[test]
    fn test_known_commands() {
        assert_eq!(known_command(&[0x00, 0x00, 0x0A, 0x00]), Some("off"));
        assert_eq!(known_command(&[0x03, 0x00, 0x0A, 0x00]), Some("on"));
        assert_eq!(known_command(&[0x03, 0x00, 0x0A, 0x01]), Some("set 10"));
        assert_eq!(known_command(&[0x01, 0x00, 0x0A, 0x00]), None);
        assert_eq!(known_command(&[]), None);
    }
}
