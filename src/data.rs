use std::fmt::Display;

use strum_macros::{AsRefStr, EnumIter, EnumString};

fn get_prefix_and_scale(val: f64) -> (&'static str, f64) {
    let aval = val.abs();
    if aval == 0.0 {
        ("", val)
    } else if aval < 1e-6 {
        ("n", val / 1e-9)
    } else if aval < 1e-3 {
        ("u", val / 1e-6)
    } else if aval < 1e0 {
        ("m", val / 1e-3)
    } else if aval < 1e3 {
        ("", val)
    } else {
        ("k", val / 1e3)
    }
}

/// Output state of one channel, as the instrument panel shows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum OutputState {
    #[strum(serialize = "ON")]
    On,
    #[strum(serialize = "OFF")]
    Off,
}
impl Display for OutputState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}
impl From<OutputState> for bool {
    fn from(value: OutputState) -> Self {
        value == OutputState::On
    }
}
impl From<bool> for OutputState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    /// Voltage - volts
    Voltage,
    /// Current - amps
    Current,
}
impl Unit {
    fn unit_abbrev(&self) -> &'static str {
        match self {
            Self::Voltage => "V",
            Self::Current => "A",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Reading {
    pub unit: Unit,
    pub value: f64,
}
impl Reading {
    pub fn new(unit: Unit, value: f64) -> Self {
        Self { unit, value }
    }
}
impl Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (prefix, value) = get_prefix_and_scale(self.value);

        write!(f, "{} {}{}", value, prefix, self.unit.unit_abbrev())
    }
}
