//! Wire commands understood by the CPX400DP.

use std::fmt::Display;

/// One command line, without its terminator.
///
/// Channels are forwarded as given; the instrument itself rejects anything other than 1 or 2.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    SetVoltage { channel: u8, volts: f64 },
    SetCurrent { channel: u8, amps: f64 },
    SetOutput { channel: u8, enabled: bool },
    Lock,
    Unlock,
    /// Programmed voltage, `V{c}?`
    GetSetVoltage { channel: u8 },
    /// Programmed current limit, `I{c}?`
    GetSetCurrent { channel: u8 },
    /// Measured voltage, `V{c}O?`
    GetOutputVoltage { channel: u8 },
    /// Measured current, `I{c}O?`
    GetOutputCurrent { channel: u8 },
    GetOutputStatus { channel: u8 },
    Identify,
}
impl Command {
    /// Whether the instrument answers this command with a line.
    pub fn is_query(&self) -> bool {
        !matches!(
            self,
            Self::SetVoltage { .. }
                | Self::SetCurrent { .. }
                | Self::SetOutput { .. }
                | Self::Lock
                | Self::Unlock
        )
    }

    /// Encoded line, newline terminated. Values always carry a decimal point (`5.0`, not `5`).
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{self}\n").into_bytes()
    }
}
impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SetVoltage { channel, volts } => write!(f, "V{channel} {volts:?}"),
            Self::SetCurrent { channel, amps } => write!(f, "I{channel} {amps:?}"),
            Self::SetOutput { channel, enabled } => write!(f, "OP{channel} {}", *enabled as u8),
            Self::Lock => write!(f, "IFLOCK"),
            Self::Unlock => write!(f, "IFUNLOCK"),
            Self::GetSetVoltage { channel } => write!(f, "V{channel}?"),
            Self::GetSetCurrent { channel } => write!(f, "I{channel}?"),
            Self::GetOutputVoltage { channel } => write!(f, "V{channel}O?"),
            Self::GetOutputCurrent { channel } => write!(f, "I{channel}O?"),
            Self::GetOutputStatus { channel } => write!(f, "OP{channel}?"),
            Self::Identify => write!(f, "*IDN?"),
        }
    }
}
