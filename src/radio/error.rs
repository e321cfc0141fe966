use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RadioError {
    #[error("no data received within {0:?}")]
    Timeout(Duration),
    #[error("incomplete frame: {bytes} bytes without terminator")]
    Incomplete { bytes: usize },
    #[error("frame exceeded {limit} bytes without terminator, discarded {bytes} bytes")]
    Overflow { bytes: usize, limit: usize },
    #[error("serial port error: {0}")]
    Open(#[from] serialport::Error),
    #[error("serial IO error: {0}")]
    Io(#[from] std::io::Error),
}
