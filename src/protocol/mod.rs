use std::io;

pub mod command;
#[cfg(test)]
pub(crate) mod mock;
pub mod response;
pub mod serial;

pub use command::Command;
pub use response::NumericFormat;
pub use serial::{SerialBackend, SerialTransport};

/// Baud rate used when none is given
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Hardware-ID prefix of the CPX400DP USB virtual COM port (vendor:product `103E:0460`)
pub const HWID_PREFIX: &str = "USB VID:PID=103E:0460";

/// Remote command reference for the instrument
pub const DOCUMENTATION_URL: &str =
    "https://resources.aimtti.com/manuals/CPX400DP_Instruction_Manual-Iss1.pdf#page=28";

/// Byte stream to the instrument.
///
/// Implementations only need to move bytes; framing of commands is done by the client.
pub trait Transport: Send {
    /// Write all of `data`.
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Block until one full `\n` terminated line has been received. The terminator is included.
    fn recv_line(&mut self) -> io::Result<Vec<u8>>;

    /// Release the endpoint.
    fn close(self: Box<Self>) -> io::Result<()>;

    fn query(&mut self, data: &[u8]) -> io::Result<Vec<u8>> {
        self.send(data)?;
        self.recv_line()
    }
}

/// A serial port visible to the host, as seen during discovery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortDescriptor {
    /// Device path or name, e.g. `/dev/ttyACM0` or `COM3`
    pub device: String,
    /// Hardware ID, e.g. `USB VID:PID=103E:0460 SER=123456`
    pub hwid: String,
}
impl PortDescriptor {
    pub fn new(device: impl Into<String>, hwid: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            hwid: hwid.into(),
        }
    }

    /// Whether this port belongs to a CPX400DP.
    pub fn is_cpx400dp(&self) -> bool {
        self.hwid.starts_with(HWID_PREFIX)
    }
}

/// Enumerates and opens ports.
pub trait Backend {
    fn enumerate(&self) -> io::Result<Vec<PortDescriptor>>;

    fn open(
        &self,
        port: &str,
        baud_rate: u32,
    ) -> Result<Box<dyn Transport>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Render line endings visibly for trace output.
pub(crate) fn printable(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .replace('\n', "␤")
        .replace('\r', "␊")
}
