use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use super::channel::SerialChannel;

/// Channel that replays scripted reads, one step per poll.
///
/// An empty step is a poll where nothing is buffered. Once the script runs out
/// the channel stays idle, or fails if built with [`ScriptedChannel::then_fail`].
#[derive(Default)]
pub struct ScriptedChannel {
    steps: VecDeque<Vec<u8>>,
    fail_when_done: bool,
    pub written: Arc<Mutex<Vec<u8>>>,
}

impl ScriptedChannel {
    pub fn new<I, B>(steps: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self {
            steps: steps.into_iter().map(|s| s.as_ref().to_vec()).collect(),
            fail_when_done: false,
            written: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn then_fail(mut self) -> Self {
        self.fail_when_done = true;
        self
    }

    pub fn idle() -> Self {
        Self::default()
    }
}

impl SerialChannel for ScriptedChannel {
    fn bytes_to_read(&mut self) -> io::Result<usize> {
        match self.steps.front() {
            Some(step) if step.is_empty() => {
                self.steps.pop_front();
                Ok(0)
            }
            Some(step) => Ok(step.len()),
            None if self.fail_when_done => Err(unplugged()),
            None => Ok(0),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(step) = self.steps.front_mut() else {
            return Ok(0);
        };
        let n = step.len().min(buf.len());
        buf[..n].copy_from_slice(&step[..n]);
        step.drain(..n);
        if step.is_empty() {
            self.steps.pop_front();
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.written.lock().unwrap().extend_from_slice(data);
        Ok(())
    }
}

/// Channel whose reads always fail.
pub struct BrokenChannel;

impl SerialChannel for BrokenChannel {
    fn bytes_to_read(&mut self) -> io::Result<usize> {
        Err(unplugged())
    }

    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(unplugged())
    }

    fn write_all(&mut self, _data: &[u8]) -> io::Result<()> {
        Err(unplugged())
    }
}

fn unplugged() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "modem unplugged")
}
