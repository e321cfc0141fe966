use std::io;
use std::time::Duration;

use serialport::SerialPort;

use crate::config::SerialConfig;

use super::error::RadioError;

/// Byte-level access to the radio modem.
pub trait SerialChannel: Send {
    /// Number of bytes that can be read without blocking.
    fn bytes_to_read(&mut self) -> io::Result<usize>;
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
}

impl SerialChannel for Box<dyn SerialPort> {
    fn bytes_to_read(&mut self) -> io::Result<usize> {
        let n = SerialPort::bytes_to_read(&**self)?;
        Ok(n as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut **self, buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        io::Write::write_all(&mut **self, data)?;
        io::Write::flush(&mut **self)
    }
}

/// Opens the modem port as 8N1 without flow control.
pub fn open_port(config: &SerialConfig) -> Result<Box<dyn SerialPort>, RadioError> {
    log::info!(
        "Opening radio modem on {} at {} baud",
        config.port,
        config.baud_rate
    );

    let port = serialport::new(&config.port, config.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(Duration::from_millis(20))
        .open()?;

    Ok(port)
}
