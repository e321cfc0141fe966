use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::sleep;

use crate::radio::{RadioError, RadioFrame, Receiver, SerialChannel};
use crate::relay::Dispatcher;
use crate::telemetry::{decode, DecodeError};

/// Pause after a serial IO error before polling the modem again.
const IO_ERROR_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct StationStats {
    pub started_at: DateTime<Utc>,
    pub frames: u64,
    pub records: u64,
    pub rejected: u64,
    pub timeouts: u64,
    pub radio_errors: u64,
    pub last_record_at: Option<DateTime<Utc>>,
}

impl StationStats {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            frames: 0,
            records: 0,
            rejected: 0,
            timeouts: 0,
            radio_errors: 0,
            last_record_at: None,
        }
    }
}

/// What one pass of the receive loop did.
#[derive(Debug)]
pub enum Cycle {
    Dispatched,
    Rejected(DecodeError),
    TimedOut,
    RadioFailed(RadioError),
}

/// Supervisory loop: receive, decode, hand off to the dispatcher.
pub struct Station<C> {
    receiver: Receiver<C>,
    dispatcher: Dispatcher,
    receive_timeout: Duration,
    stats: StationStats,
}

impl<C: SerialChannel> Station<C> {
    pub fn new(receiver: Receiver<C>, dispatcher: Dispatcher, receive_timeout: Duration) -> Self {
        Self {
            receiver,
            dispatcher,
            receive_timeout,
            stats: StationStats::new(),
        }
    }

    #[cfg(test)]
    pub fn stats(&self) -> &StationStats {
        &self.stats
    }

    /// Runs one receive cycle. Never blocks longer than the receive timeout
    /// plus the wait for a free dispatch slot.
    #[cfg(test)]
    pub async fn cycle(&mut self) -> Cycle {
        let received = self.receiver.receive(self.receive_timeout).await;
        let cycle = self.handle(received).await;
        if is_io_failure(&cycle) {
            sleep(IO_ERROR_PAUSE).await;
        }
        cycle
    }

    /// Decodes and dispatches what one receive produced. A decoded record is
    /// always handed to the dispatcher.
    async fn handle(&mut self, received: Result<RadioFrame, RadioError>) -> Cycle {
        let frame = match received {
            Ok(frame) => frame,
            Err(RadioError::Timeout(_)) => {
                log::warn!("No data received, timeout exceeded");
                self.stats.timeouts += 1;
                return Cycle::TimedOut;
            }
            Err(e @ RadioError::Incomplete { .. }) => {
                log::warn!("{}", e);
                self.stats.timeouts += 1;
                return Cycle::TimedOut;
            }
            Err(e) => {
                log::error!("Radio receive failed: {}", e);
                self.stats.radio_errors += 1;
                return Cycle::RadioFailed(e);
            }
        };
        self.stats.frames += 1;

        let record = match decode(&frame.text()) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Dropping frame {:?}: {}", frame.text(), e);
                self.stats.rejected += 1;
                return Cycle::Rejected(e);
            }
        };

        let _ = self.dispatcher.dispatch(record).await;
        self.stats.records += 1;
        self.stats.last_record_at = Some(Utc::now());
        Cycle::Dispatched
    }

    /// Cycles until `shutdown` resolves, then waits for in-flight dispatches.
    ///
    /// Shutdown only interrupts the wait for a frame or the pause after an IO
    /// error. A record that was already decoded is always handed off.
    pub async fn run<F>(mut self, shutdown: F) -> StationStats
    where
        F: Future<Output = ()>,
    {
        log::info!(
            "Relay running ({:?} framing, {:?} receive timeout)",
            self.receiver.mode(),
            self.receive_timeout
        );

        tokio::pin!(shutdown);
        loop {
            let received = tokio::select! {
                _ = &mut shutdown => break,
                r = self.receiver.receive(self.receive_timeout) => r,
            };
            let cycle = self.handle(received).await;
            if is_io_failure(&cycle) {
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = sleep(IO_ERROR_PAUSE) => {}
                }
            }
        }

        if self.dispatcher.in_flight() > 0 {
            log::info!(
                "Waiting for {} in-flight dispatches",
                self.dispatcher.in_flight()
            );
        }
        self.dispatcher.drain().await;
        self.stats
    }
}

fn is_io_failure(cycle: &Cycle) -> bool {
    matches!(cycle, Cycle::RadioFailed(RadioError::Io(_)))
}
