//! In-memory transport and backend for unit tests.

use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex},
};

use crate::protocol::{Backend, PortDescriptor, Transport};

#[derive(Debug, Default)]
pub struct MockState {
    /// Everything written to the transport
    pub written: Vec<u8>,
    /// Lines handed out by `recv_line`, in order
    pub replies: VecDeque<Vec<u8>>,
    pub fail_write: bool,
    pub fail_read: bool,
    pub fail_close: bool,
    pub closed: bool,
}

/// Transport whose state stays inspectable after it has been moved into a client.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}
impl MockTransport {
    pub fn reply(&self, line: &str) -> &Self {
        self.reply_bytes(line.as_bytes())
    }

    pub fn reply_bytes(&self, line: &[u8]) -> &Self {
        self.state().replies.push_back(line.to_vec());
        self
    }

    pub fn written(&self) -> String {
        String::from_utf8_lossy(&self.state().written).into_owned()
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}
impl Transport for MockTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.state();
        if state.fail_write {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "simulated write error"));
        }
        state.written.extend_from_slice(data);
        Ok(())
    }

    fn recv_line(&mut self) -> io::Result<Vec<u8>> {
        let mut state = self.state();
        if state.fail_read {
            return Err(io::Error::new(io::ErrorKind::Other, "simulated read error"));
        }
        state
            .replies
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no reply scripted"))
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let mut state = self.state();
        state.closed = true;
        if state.fail_close {
            return Err(io::Error::new(io::ErrorKind::Other, "simulated close error"));
        }
        Ok(())
    }
}

/// Backend with a fixed port list; every open hands out the same [MockTransport].
#[derive(Clone, Default)]
pub struct MockBackend {
    pub ports: Vec<PortDescriptor>,
    pub transport: MockTransport,
    pub opened: Arc<Mutex<Vec<(String, u32)>>>,
    pub fail_open: bool,
    pub fail_enumerate: bool,
}
impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ports(ports: Vec<PortDescriptor>) -> Self {
        Self {
            ports,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<(String, u32)> {
        self.opened.lock().unwrap().clone()
    }
}
impl Backend for MockBackend {
    fn enumerate(&self) -> io::Result<Vec<PortDescriptor>> {
        if self.fail_enumerate {
            return Err(io::Error::new(io::ErrorKind::Other, "simulated enumeration error"));
        }
        Ok(self.ports.clone())
    }

    fn open(
        &self,
        port: &str,
        baud_rate: u32,
    ) -> Result<Box<dyn Transport>, Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_open {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "simulated busy port").into());
        }
        self.opened.lock().unwrap().push((port.to_string(), baud_rate));
        Ok(Box::new(self.transport.clone()))
    }
}
