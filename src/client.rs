//! Client for one CPX400DP.
//!
//! Every operation is a single blocking exchange on the serial link: setters write one line and
//! read nothing back, queries write one line and read exactly one reply line. Operations take
//! `&mut self`; the link has no way to pair replies with queries other than strict ordering, so
//! a client shared between threads must sit behind a lock.

use std::{
    fmt::{self, Debug},
    sync::Arc,
};

use log::{Level, Log, Metadata, Record};

use crate::{
    data::OutputState,
    error::{Error, Result},
    model::Identification,
    protocol::{
        self, Backend, Command, DEFAULT_BAUD_RATE, NumericFormat, PortDescriptor, SerialBackend,
        Transport, response,
    },
};

const LOG_TARGET: &str = "cpx400dp";

macro_rules! psu_log {
    ($client:expr, $lvl:expr, $($arg:tt)+) => {
        $client.emit($lvl, format_args!($($arg)+))
    };
}

/// Forwards to whichever logger is installed with the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalLogger;
impl Log for GlobalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() <= log::max_level() {
            log::logger().log(record);
        }
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// Outcome of scanning the host's serial ports for instruments
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Discovery {
    /// Exactly one instrument found
    Unique(PortDescriptor),
    NotFound,
    /// Several instruments found; a port has to be chosen explicitly
    Ambiguous(Vec<PortDescriptor>),
}

pub struct InstrumentClient<B: Backend = SerialBackend> {
    backend: B,
    logger: Arc<dyn Log>,
    /// Port of the current or most recent connection
    port: Option<String>,
    transport: Option<Box<dyn Transport>>,
}
impl InstrumentClient<SerialBackend> {
    pub fn new() -> Self {
        Self::with_backend(SerialBackend::new())
    }
}
impl Default for InstrumentClient<SerialBackend> {
    fn default() -> Self {
        Self::new()
    }
}
impl<B: Backend> InstrumentClient<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            logger: Arc::new(GlobalLogger),
            port: None,
            transport: None,
        }
    }

    /// Use `logger` instead of the global `log` logger.
    pub fn with_logger(mut self, logger: Arc<dyn Log>) -> Self {
        self.logger = logger;
        self
    }

    /// Port of the current connection, or of the last one after [Self::disconnect].
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Connect at [DEFAULT_BAUD_RATE].
    pub fn connect(&mut self, port: &str) -> Result<()> {
        self.connect_with_baud(port, DEFAULT_BAUD_RATE)
    }

    pub fn connect_with_baud(&mut self, port: &str, baud_rate: u32) -> Result<()> {
        if self.transport.is_some() {
            let current = self.port.clone().unwrap_or_default();
            psu_log!(self, Level::Error, "Refusing to connect to \"{port}\", already connected");
            return Err(Error::AlreadyConnected(current));
        }

        psu_log!(self, Level::Debug, "Connecting to \"{port}\" with speed {baud_rate}...");
        match self.backend.open(port, baud_rate) {
            Ok(transport) => {
                self.transport = Some(transport);
                self.port = Some(port.to_string());
                psu_log!(self, Level::Debug, "Connected to \"{port}\" with speed {baud_rate}");
                Ok(())
            }
            Err(source) => {
                psu_log!(self, Level::Error, "Could not connect to \"{port}\" due to {source}");
                Err(Error::ConnectionFailure {
                    port: port.to_string(),
                    source,
                })
            }
        }
    }

    /// Look for instruments among the host's serial ports. Nothing is opened.
    pub fn discover(&self) -> Result<Discovery> {
        psu_log!(self, Level::Debug, "Scanning serial ports...");
        let ports = self.backend.enumerate().map_err(|e| {
            psu_log!(self, Level::Error, "Could not enumerate serial ports due to {e}");
            Error::DiscoveryFailure(e)
        })?;

        let mut found: Vec<_> = ports.into_iter().filter(|p| p.is_cpx400dp()).collect();
        psu_log!(self, Level::Debug, "Found {} instrument port(s)", found.len());

        Ok(match found.len() {
            0 => Discovery::NotFound,
            1 => Discovery::Unique(found.remove(0)),
            _ => Discovery::Ambiguous(found),
        })
    }

    /// Connect to the only instrument attached to the host.
    pub fn discover_and_connect(&mut self) -> Result<()> {
        match self.discover()? {
            Discovery::Unique(port) => self.connect(&port.device),
            Discovery::NotFound => {
                let err = Error::DeviceNotFound;
                psu_log!(self, Level::Error, "{err}");
                Err(err)
            }
            Discovery::Ambiguous(ports) => {
                let err = Error::AmbiguousDevice(ports.into_iter().map(|p| p.device).collect());
                psu_log!(self, Level::Error, "{err}");
                Err(err)
            }
        }
    }

    /// Close the transport. The client is disconnected afterwards even if closing fails.
    pub fn disconnect(&mut self) -> Result<()> {
        let Some(transport) = self.transport.take() else {
            psu_log!(self, Level::Error, "Cannot terminate connection, not connected");
            return Err(Error::NotConnected);
        };

        psu_log!(self, Level::Debug, "Terminating connection...");
        transport.close().map_err(|e| {
            psu_log!(self, Level::Error, "Could not terminate connection due to {e}");
            Error::TransportFailure(e)
        })?;
        psu_log!(self, Level::Debug, "Terminated connection");

        Ok(())
    }

    pub fn set_voltage(&mut self, volts: f64, channel: u8) -> Result<()> {
        self.command(
            format!("setting voltage for channel {channel} to {volts} V"),
            Command::SetVoltage { channel, volts },
        )
    }

    pub fn set_current(&mut self, amps: f64, channel: u8) -> Result<()> {
        self.command(
            format!("setting current for channel {channel} to {amps} A"),
            Command::SetCurrent { channel, amps },
        )
    }

    pub fn enable_output(&mut self, channel: u8) -> Result<()> {
        self.command(
            format!("enabling channel {channel}"),
            Command::SetOutput {
                channel,
                enabled: true,
            },
        )
    }

    pub fn disable_output(&mut self, channel: u8) -> Result<()> {
        self.command(
            format!("disabling channel {channel}"),
            Command::SetOutput {
                channel,
                enabled: false,
            },
        )
    }

    /// Programmed voltage of `channel`.
    pub fn get_set_voltage(&mut self, channel: u8) -> Result<f64> {
        self.query(
            format!("getting set voltage for channel {channel}"),
            Command::GetSetVoltage { channel },
            |line| NumericFormat::EchoPrefixed.parse(line),
        )
    }

    /// Programmed current limit of `channel`.
    pub fn get_set_current(&mut self, channel: u8) -> Result<f64> {
        self.query(
            format!("getting set current for channel {channel}"),
            Command::GetSetCurrent { channel },
            |line| NumericFormat::EchoPrefixed.parse(line),
        )
    }

    /// Measured voltage at the terminals of `channel`.
    pub fn get_output_voltage(&mut self, channel: u8) -> Result<f64> {
        self.query(
            format!("getting output voltage for channel {channel}"),
            Command::GetOutputVoltage { channel },
            |line| NumericFormat::DigitFiltered.parse(line),
        )
    }

    /// Measured current through `channel`.
    pub fn get_output_current(&mut self, channel: u8) -> Result<f64> {
        self.query(
            format!("getting output current for channel {channel}"),
            Command::GetOutputCurrent { channel },
            |line| NumericFormat::DigitFiltered.parse(line),
        )
    }

    pub fn get_output_status(&mut self, channel: u8) -> Result<OutputState> {
        self.query(
            format!("getting output status for channel {channel}"),
            Command::GetOutputStatus { channel },
            response::parse_output_state,
        )
    }

    /// Lock the front panel.
    ///
    /// Unlike the other operations a failure here is only logged, never returned.
    pub fn lock(&mut self) {
        let _ = self.command("locking settings".into(), Command::Lock);
    }

    /// Unlock the front panel. Failures are only logged, as with [Self::lock].
    pub fn unlock(&mut self) {
        let _ = self.command("unlocking settings".into(), Command::Unlock);
    }

    pub fn get_identification(&mut self) -> Result<Identification> {
        self.query(
            "getting identification info".into(),
            Command::Identify,
            Identification::from_idn,
        )
    }

    fn command(&mut self, action: String, cmd: Command) -> Result<()> {
        psu_log!(self, Level::Debug, "{action}...");
        match self.send(cmd) {
            Ok(()) => {
                psu_log!(self, Level::Debug, "{action}: done");
                Ok(())
            }
            Err(e) => {
                psu_log!(self, Level::Error, "An error occurred while {action} due to {e}");
                Err(e)
            }
        }
    }

    fn query<T: Debug>(
        &mut self,
        action: String,
        cmd: Command,
        parse: impl FnOnce(&str) -> Result<T>,
    ) -> Result<T> {
        psu_log!(self, Level::Debug, "{action}...");
        match self.exchange(cmd).and_then(|line| parse(&line)) {
            Ok(value) => {
                psu_log!(self, Level::Debug, "{action}: {value:?}");
                Ok(value)
            }
            Err(e) => {
                psu_log!(self, Level::Error, "An error occurred while {action} due to {e}");
                Err(e)
            }
        }
    }

    fn send(&mut self, cmd: Command) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        transport.send(&cmd.to_bytes())?;
        Ok(())
    }

    fn exchange(&mut self, cmd: Command) -> Result<String> {
        let transport = self.transport.as_mut().ok_or(Error::NotConnected)?;
        let resp = transport.query(&cmd.to_bytes())?;
        String::from_utf8(resp).map_err(|e| {
            Error::ProtocolParseError(format!(
                "Response `{}` is not valid UTF-8: {e}",
                protocol::printable(e.as_bytes())
            ))
        })
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let port = self.port.as_deref().unwrap_or("-");
        let prefix = match &self.port {
            Some(port) => format!("CPX400DP {port}"),
            None => "CPX400DP".to_string(),
        };

        self.logger.log(
            &Record::builder()
                .level(level)
                .target(LOG_TARGET)
                .module_path_static(Some(module_path!()))
                .file_static(Some(file!()))
                .key_values(&("port", port))
                .args(format_args!("{prefix}: {args}"))
                .build(),
        );
    }
}
impl<B: Backend> Debug for InstrumentClient<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrumentClient")
            .field("port", &self.port)
            .field("connected", &self.is_connected())
            .finish()
    }
}
