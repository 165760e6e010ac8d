use std::fmt::Display;

use crate::error::{Error, Result};

/// Reply to `*IDN?`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identification {
    /// Manufacturer, e.g. `THURLBY THANDAR`
    pub name: String,
    /// Model string
    pub model: String,
    /// Serial number
    pub serial: String,
    /// Firmware version
    pub version: String,
}
impl Identification {
    /// Parse a `*IDN?` line. The instrument separates fields with `", "`, but plain commas are
    /// accepted too. Fields past the fourth are ignored.
    pub fn from_idn(idn: &str) -> Result<Self> {
        let fields: Vec<_> = idn.split(',').map(str::trim).collect();
        let &[name, model, serial, version, ..] = fields.as_slice() else {
            return Err(Error::ProtocolParseError(format!(
                "Invalid *IDN? response: `{}`",
                idn.trim()
            )));
        };

        Ok(Self {
            name: name.to_string(),
            model: model.to_string(),
            serial: serial.to_string(),
            version: version.to_string(),
        })
    }
}
impl Display for Identification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (serial {}, firmware {})",
            self.name, self.model, self.serial, self.version
        )
    }
}
