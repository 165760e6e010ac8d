//! Parsers for the reply lines of the CPX400DP.
//!
//! The instrument answers settings queries with an echo of the query token (`V1 12.500`) and
//! measurement queries with a value followed by a unit (`12.34V`). The two shapes are not
//! interchangeable, so each query names the format it expects.

use crate::{
    data::OutputState,
    error::{Error, Result},
};

/// Width of the query token echoed in front of settings replies, e.g. `V1 `
const ECHO_WIDTH: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericFormat {
    /// Fixed-width echo of the query token, then the value.
    EchoPrefixed,
    /// Value with arbitrary decoration (unit suffix, line ending); only digits and `.` are kept.
    DigitFiltered,
}
impl NumericFormat {
    pub fn parse(self, line: &str) -> Result<f64> {
        let value: String = match self {
            Self::EchoPrefixed => line.chars().skip(ECHO_WIDTH).collect::<String>().trim().into(),
            Self::DigitFiltered => line
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect(),
        };

        value.parse().map_err(|e| {
            Error::ProtocolParseError(format!("Could not parse response `{}`: {e}", line.trim()))
        })
    }
}

/// Output status reply: the first character is `1` when the output is on.
pub fn parse_output_state(line: &str) -> Result<OutputState> {
    match line.chars().next().and_then(|c| c.to_digit(10)) {
        Some(1) => Ok(OutputState::On),
        Some(_) => Ok(OutputState::Off),
        None => Err(Error::ProtocolParseError(format!(
            "Invalid output status response: `{}`",
            line.trim()
        ))),
    }
}
