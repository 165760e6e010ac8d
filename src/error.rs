use std::{fmt::Display, result};

pub type Result<T, E = Error> = result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Serial port could not be opened
    ConnectionFailure {
        port: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Serial ports could not be enumerated
    DiscoveryFailure(std::io::Error),
    /// No instrument detected during discovery
    DeviceNotFound,
    /// More than one instrument detected during discovery
    AmbiguousDevice(Vec<String>),
    /// A transport is already open on this client
    AlreadyConnected(String),
    /// Operation requires an open transport
    NotConnected,
    /// Write, read or close failed at the I/O layer
    TransportFailure(std::io::Error),
    /// Device returned a response that we could not parse
    ProtocolParseError(String),
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ConnectionFailure { source, .. } => Some(source.as_ref()),
            Error::DiscoveryFailure(e) | Error::TransportFailure(e) => Some(e),
            _ => None,
        }
    }
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ConnectionFailure { port, source } => {
                write!(f, "Could not connect to {port}: {source}")
            }
            Error::DiscoveryFailure(e) => write!(f, "Could not enumerate serial ports: {e}"),
            Error::DeviceNotFound => write!(f, "No CPX400DP supplies detected"),
            Error::AmbiguousDevice(ports) => write!(
                f,
                "Multiple CPX400DP supplies detected ({}), one must be specified",
                ports.join(", ")
            ),
            Error::AlreadyConnected(port) => write!(f, "Already connected to {port}"),
            Error::NotConnected => write!(f, "Not connected"),
            Error::TransportFailure(e) => write!(f, "Transport error: {e}"),
            Error::ProtocolParseError(e) => write!(f, "Bad response: {e}"),
        }
    }
}
impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::TransportFailure(value)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn io_errors_become_transport_failures() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, Error::TransportFailure(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn ambiguous_device_lists_ports() {
        let err = Error::AmbiguousDevice(vec!["/dev/ttyACM0".into(), "/dev/ttyACM1".into()]);
        let msg = err.to_string();
        assert!(msg.contains("/dev/ttyACM0, /dev/ttyACM1"));
        assert!(msg.contains("must be specified"));
    }

    #[test]
    fn connection_failure_keeps_cause() {
        let err = Error::ConnectionFailure {
            port: "COM7".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into(),
        };
        assert_eq!(err.to_string(), "Could not connect to COM7: denied");
        assert_eq!(err.source().map(|e| e.to_string()), Some("denied".into()));
    }
}
