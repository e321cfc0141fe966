use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::error::LinkError;
use super::probe::Link;

/// Link whose reachability is flipped by the test.
pub struct FakeLink {
    up: AtomicBool,
    attempts: AtomicUsize,
}

impl FakeLink {
    pub fn new(up: bool) -> Arc<Self> {
        Arc::new(Self {
            up: AtomicBool::new(up),
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Link for FakeLink {
    fn connect(&self) -> Result<(), LinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.up.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LinkError::Unreachable {
                address: "fake:0".to_string(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "down"),
            })
        }
    }
}
