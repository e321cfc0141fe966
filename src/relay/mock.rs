use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::error::DeliveryError;
use super::transport::Transport;

/// Transport that records every request instead of sending it.
#[derive(Default)]
pub struct RecordingTransport {
    pub requests: Mutex<Vec<(String, String)>>,
    /// Answer 503 for URLs containing this string.
    pub fail_urls_containing: Option<&'static str>,
    /// Fail every request as if the network were gone.
    pub refuse: bool,
    pub delay: Option<Duration>,
    pub active: AtomicUsize,
    pub peak: AtomicUsize,
}

impl RecordingTransport {
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn post(&self, url: &str, body: &str) -> Result<u16, DeliveryError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), body.to_string()));
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.refuse {
            return Err(DeliveryError::Transport("connection refused".into()));
        }
        match self.fail_urls_containing {
            Some(s) if url.contains(s) => Err(DeliveryError::Status(503)),
            _ => Ok(200),
        }
    }
}
