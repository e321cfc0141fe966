use std::io;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{sleep, Instant};

use super::channel::SerialChannel;
use super::error::RadioError;
use super::frame::RadioFrame;

/// Upper bound on bytes buffered while waiting for a line terminator.
pub const MAX_FRAME_LEN: usize = 1024;

/// How the receiver decides a frame is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameMode {
    /// Any non-empty read is a frame, however short. Messages split across
    /// reads are not reassembled.
    FirstRead,
    /// A frame ends at `\n`. Partial lines are kept until the terminator
    /// arrives.
    #[default]
    Line,
}

pub struct Receiver<C> {
    channel: C,
    mode: FrameMode,
    poll_interval: Duration,
    pending: Vec<u8>,
}

impl<C: SerialChannel> Receiver<C> {
    pub fn new(channel: C, mode: FrameMode, poll_interval: Duration) -> Self {
        Self {
            channel,
            mode,
            poll_interval,
            pending: Vec::with_capacity(MAX_FRAME_LEN),
        }
    }

    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    /// Waits up to `timeout` for a frame.
    ///
    /// Buffered input is drained immediately; while nothing usable is
    /// available the channel is re-polled every `poll_interval`.
    pub async fn receive(&mut self, timeout: Duration) -> Result<RadioFrame, RadioError> {
        let deadline = Instant::now() + timeout;

        loop {
            // A line already buffered is returned without touching the channel.
            let frame = match self.take_frame()? {
                Some(frame) => Some(frame),
                None => {
                    self.drain()?;
                    self.take_frame()?
                }
            };

            if let Some(frame) = frame {
                log::info!("Received {} bytes: {}", frame.len(), frame.text());
                log::trace!("Raw frame: {:02x?}", frame.as_bytes());
                return Ok(frame);
            }

            if Instant::now() >= deadline {
                break;
            }
            sleep(self.poll_interval).await;
        }

        if self.pending.is_empty() {
            Err(RadioError::Timeout(timeout))
        } else {
            Err(RadioError::Incomplete {
                bytes: self.pending.len(),
            })
        }
    }

    /// Writes one line to the modem for transmission.
    pub fn send(&mut self, line: &str) -> Result<(), RadioError> {
        let mut data = line.trim_end_matches(['\r', '\n']).as_bytes().to_vec();
        data.push(b'\n');
        self.channel.write_all(&data)?;
        log::info!("Sent: {}", line.trim_end());
        Ok(())
    }

    fn drain(&mut self) -> Result<usize, RadioError> {
        let available = self.channel.bytes_to_read()?;
        if available == 0 {
            return Ok(0);
        }

        let mut buf = vec![0u8; available.min(MAX_FRAME_LEN)];
        let n = match self.channel.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => 0,
            Err(e) => return Err(e.into()),
        };
        self.pending.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn take_frame(&mut self) -> Result<Option<RadioFrame>, RadioError> {
        match self.mode {
            FrameMode::FirstRead => {
                if self.pending.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(RadioFrame::new(std::mem::take(&mut self.pending))))
                }
            }
            FrameMode::Line => {
                if let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
                    let rest = self.pending.split_off(pos + 1);
                    let line = std::mem::replace(&mut self.pending, rest);
                    if line.len() > MAX_FRAME_LEN {
                        return Err(RadioError::Overflow {
                            bytes: line.len(),
                            limit: MAX_FRAME_LEN,
                        });
                    }
                    return Ok(Some(RadioFrame::new(line)));
                }
                if self.pending.len() > MAX_FRAME_LEN {
                    let bytes = self.pending.len();
                    self.pending.clear();
                    return Err(RadioError::Overflow {
                        bytes,
                        limit: MAX_FRAME_LEN,
                    });
                }
                Ok(None)
            }
        }
    }
}
