use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::error::LinkError;

/// Something that can tell whether the backend is reachable.
///
/// `connect` blocks; callers run it off the async runtime.
pub trait Link: Send + Sync + 'static {
    fn connect(&self) -> Result<(), LinkError>;
}

/// Treats the link as up when a TCP connection to the backend succeeds.
pub struct TcpProbeLink {
    address: String,
    timeout: Duration,
}

impl TcpProbeLink {
    pub fn new(address: String, timeout: Duration) -> Self {
        Self { address, timeout }
    }
}

impl Link for TcpProbeLink {
    fn connect(&self) -> Result<(), LinkError> {
        let addrs = self
            .address
            .to_socket_addrs()
            .map_err(|source| LinkError::Resolve {
                address: self.address.clone(),
                source,
            })?;

        let mut last_err =
            io::Error::new(io::ErrorKind::AddrNotAvailable, "no addresses resolved");
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(_) => return Ok(()),
                Err(e) => last_err = e,
            }
        }

        Err(LinkError::Unreachable {
            address: self.address.clone(),
            source: last_err,
        })
    }
}
