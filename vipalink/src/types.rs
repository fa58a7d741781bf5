// vipalink-rs/vipalink/src/types.rs

use std::fmt;

/// Terminal serial number - Newtype Pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceIdentifier(String);

impl DeviceIdentifier {
    /// Wrap a serial-number string.
    pub fn new(serial_number: impl Into<String>) -> Self {
        Self(serial_number.into())
    }

    /// The serial number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceIdentifier {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// SW1/SW2 trailing status pair carried by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusWord {
    /// First status byte.
    pub sw1: u8,
    /// Second status byte.
    pub sw2: u8,
}

impl StatusWord {
    /// The success pair `90 00`.
    pub const SUCCESS: Self = Self {
        sw1: crate::constants::SW1_SUCCESS,
        sw2: crate::constants::SW2_SUCCESS,
    };

    /// Build from the two raw bytes.
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self { sw1, sw2 }
    }

    /// Whether this equals the success pair.
    pub fn is_success(&self) -> bool {
        *self == Self::SUCCESS
    }

    /// Combined 16-bit view, SW1 in the high byte.
    pub fn as_u16(&self) -> u16 {
        (self.sw1 as u16) << 8 | self.sw2 as u16
    }
}

/// VipaCommandType
///
/// CLA/INS pairs for the command vocabulary this crate drives. The chained
/// response heuristic keys off `ResetDevice` and `DisplayHtml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VipaCommandType {
    /// Soft-reset the terminal.
    ResetDevice,
    /// Render an HTML page (idle screens, version queries, signature capture).
    DisplayHtml,
    /// Enable or reset the extended ADK logger.
    ConfigureLogging,
    /// Retrieve the terminal's log archive.
    GetTerminalLogs,
}

impl VipaCommandType {
    /// The (CLA, INS) pair for this command.
    pub const fn class_ins(self) -> (u8, u8) {
        match self {
            Self::ResetDevice => (0xD0, 0x00),
            Self::DisplayHtml => (0xD2, 0x01),
            Self::ConfigureLogging => (0xD0, 0x61),
            Self::GetTerminalLogs => (0xD0, 0x62),
        }
    }

    /// Reverse lookup from a received or constructed (CLA, INS) pair.
    pub fn from_class_ins(cla: u8, ins: u8) -> Option<Self> {
        match (cla, ins) {
            (0xD0, 0x00) => Some(Self::ResetDevice),
            (0xD2, 0x01) => Some(Self::DisplayHtml),
            (0xD0, 0x61) => Some(Self::ConfigureLogging),
            (0xD0, 0x62) => Some(Self::GetTerminalLogs),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_identifier_roundtrip() {
        let id = DeviceIdentifier::new("275-640-362");
        assert_eq!(id.as_str(), "275-640-362");
        assert_eq!(format!("{}", id), "275-640-362");
    }

    #[test]
    fn status_word_success() {
        assert!(StatusWord::new(0x90, 0x00).is_success());
        assert!(!StatusWord::new(0x9F, 0x41).is_success());
        assert_eq!(StatusWord::new(0x90, 0x00).as_u16(), 0x9000);
    }

    #[test]
    fn command_type_lookup() {
        for ty in [
            VipaCommandType::ResetDevice,
            VipaCommandType::DisplayHtml,
            VipaCommandType::ConfigureLogging,
            VipaCommandType::GetTerminalLogs,
        ] {
            let (cla, ins) = ty.class_ins();
            assert_eq!(VipaCommandType::from_class_ins(cla, ins), Some(ty));
        }
        assert_eq!(VipaCommandType::from_class_ins(0x00, 0xA4), None);
    }
}
