use std::{
    io::{self, BufRead, BufReader, Read, Write},
    time::Duration,
};

use log::debug;
use serialport::{SerialPort, SerialPortType};

use crate::protocol::{Backend, PortDescriptor, Transport, printable};

/// Driver-level read timeout. Reads keep waiting across it, it only bounds each poll.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Host serial ports, through the `serialport` crate.
#[derive(Clone, Debug)]
pub struct SerialBackend {
    poll_interval: Duration,
}
impl SerialBackend {
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}
impl Default for SerialBackend {
    fn default() -> Self {
        Self::new()
    }
}
impl Backend for SerialBackend {
    fn enumerate(&self) -> io::Result<Vec<PortDescriptor>> {
        let ports = serialport::available_ports()?;
        Ok(ports
            .into_iter()
            .map(|p| PortDescriptor::new(p.port_name, hwid(&p.port_type)))
            .collect())
    }

    fn open(
        &self,
        port: &str,
        baud_rate: u32,
    ) -> Result<Box<dyn Transport>, Box<dyn std::error::Error + Send + Sync>> {
        let serial = serialport::new(port, baud_rate)
            .timeout(self.poll_interval)
            .open()?;
        Ok(Box::new(SerialTransport::<Box<dyn SerialPort>>::new(serial)))
    }
}

/// Hardware ID in the `USB VID:PID=VVVV:PPPP SER=...` form.
fn hwid(port_type: &SerialPortType) -> String {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let mut id = format!("USB VID:PID={:04X}:{:04X}", usb.vid, usb.pid);
            if let Some(serial) = &usb.serial_number {
                id.push_str(&format!(" SER={serial}"));
            }
            id
        }
        _ => "n/a".into(),
    }
}

/// Line framing over a serial stream, normally a port opened by [SerialBackend].
///
/// I/O traces go to the global `log` logger; only the client uses an injected one.
pub struct SerialTransport<S = Box<dyn SerialPort>> {
    serial: BufReader<S>,
}
impl<S: Read + Write> SerialTransport<S> {
    pub fn new(serial: S) -> Self {
        Self {
            serial: BufReader::new(serial),
        }
    }
}
impl<S: Read + Write + Send> Transport for SerialTransport<S> {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        debug!("send(): {}", printable(data));

        let serial = self.serial.get_mut();
        serial.write_all(data)?;
        serial.flush()
    }

    fn recv_line(&mut self) -> io::Result<Vec<u8>> {
        let mut resp = vec![];
        loop {
            match self.serial.read_until(b'\n', &mut resp) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "port closed before end of line",
                    ));
                }
                Ok(_) if resp.ends_with(b"\n") => break,
                Ok(_) => continue,
                /* Partial data stays in `resp`, keep waiting for the rest of the line */
                Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
                Err(e) => return Err(e),
            }
        }

        debug!("recv_line(): {}", printable(&resp));

        Ok(resp)
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        debug!("close()");
        self.serial.get_mut().flush()
    }
}
