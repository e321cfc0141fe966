use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

use super::error::LinkError;
use super::probe::Link;
use crate::config::LinkConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    Lost,
}

/// Cheap handle for reporting link loss and reading the current state.
#[derive(Clone)]
pub struct LinkHandle {
    events: mpsc::Sender<LinkEvent>,
    state: watch::Receiver<LinkState>,
}

impl LinkHandle {
    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    pub fn watch(&self) -> watch::Receiver<LinkState> {
        self.state.clone()
    }

    /// Asks the supervisor to reconnect. Reports made while one is already
    /// queued are coalesced.
    pub fn report_lost(&self) {
        let _ = self.events.try_send(LinkEvent::Lost);
    }
}

/// Waits up to `wait` for the link to come up, trying every `poll`.
///
/// Failing to connect is not fatal; the relay starts degraded and delivery
/// attempts fail individually until the supervisor brings the link back.
pub async fn establish<L: Link>(link: &Arc<L>, wait: Duration, poll: Duration) -> LinkState {
    let deadline = Instant::now() + wait;

    loop {
        match try_connect(link).await {
            Ok(()) => {
                log::info!("Link up");
                return LinkState::Up;
            }
            Err(e) => log::debug!("Link not ready: {}", e),
        }

        if Instant::now() >= deadline {
            log::error!(
                "Failed to reach backend within {:?}, starting without link",
                wait
            );
            return LinkState::Down;
        }
        sleep(poll).await;
    }
}

async fn try_connect<L: Link>(link: &Arc<L>) -> Result<(), LinkError> {
    let link = link.clone();
    tokio::task::spawn_blocking(move || link.connect())
        .await
        .unwrap_or_else(|e| Err(LinkError::Task(e.to_string())))
}

/// Background task that keeps the link usable.
pub struct LinkSupervisor {
    handle: LinkHandle,
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl LinkSupervisor {
    pub fn spawn<L: Link>(link: Arc<L>, initial: LinkState, config: &LinkConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel(1);
        let (state_tx, state_rx) = watch::channel(initial);
        let (stop_tx, stop_rx) = oneshot::channel();

        let join = tokio::spawn(supervise(
            link,
            state_tx,
            events_rx,
            stop_rx,
            config.probe_interval,
            config.poll,
        ));

        Self {
            handle: LinkHandle {
                events: events_tx,
                state: state_rx,
            },
            stop_tx,
            join,
        }
    }

    pub fn handle(&self) -> LinkHandle {
        self.handle.clone()
    }

    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        let _ = self.join.await;
    }
}

async fn supervise<L: Link>(
    link: Arc<L>,
    state_tx: watch::Sender<LinkState>,
    mut events: mpsc::Receiver<LinkEvent>,
    mut stop_rx: oneshot::Receiver<()>,
    probe_interval: Duration,
    poll: Duration,
) {
    loop {
        if *state_tx.borrow() == LinkState::Up {
            let lost = tokio::select! {
                _ = &mut stop_rx => return,
                Some(LinkEvent::Lost) = events.recv() => true,
                _ = sleep(probe_interval) => try_connect(&link).await.is_err(),
            };
            if !lost {
                continue;
            }
            log::warn!("Link lost. Reconnecting...");
            state_tx.send_replace(LinkState::Down);
        }

        // No backoff: retry at the poll rate until the link is back.
        loop {
            let result = tokio::select! {
                _ = &mut stop_rx => return,
                r = try_connect(&link) => r,
            };
            match result {
                Ok(()) => {
                    log::info!("Link re-established");
                    state_tx.send_replace(LinkState::Up);
                    break;
                }
                Err(e) => log::debug!("Reconnect failed: {}", e),
            }

            tokio::select! {
                _ = &mut stop_rx => return,
                _ = sleep(poll) => {}
            }
        }

        // Losses reported while reconnecting are stale.
        while events.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::mock::FakeLink;

    fn config() -> LinkConfig {
        LinkConfig {
            wait: Duration::from_millis(200),
            poll: Duration::from_millis(10),
            probe_interval: Duration::from_millis(50),
            connect_timeout: Duration::from_millis(10),
        }
    }

    async fn wait_for(rx: &mut watch::Receiver<LinkState>, want: LinkState) {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|s| *s == want))
            .await
            .expect("link state did not change in time")
            .unwrap();
    }

    #[tokio::test]
    async fn test_establish_returns_up_immediately() {
        let link = FakeLink::new(true);
        let state = establish(&link, Duration::from_secs(5), Duration::from_millis(10)).await;
        assert_eq!(state, LinkState::Up);
        assert_eq!(link.attempts(), 1);
    }

    #[tokio::test]
    async fn test_establish_gives_up_after_wait() {
        let link = FakeLink::new(false);
        let start = std::time::Instant::now();

        let state = establish(&link, Duration::from_millis(100), Duration::from_millis(10)).await;

        assert_eq!(state, LinkState::Down);
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(link.attempts() > 1);
    }

    #[tokio::test]
    async fn test_establish_waits_for_late_link() {
        let link = FakeLink::new(false);
        let late = link.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            late.set_up(true);
        });

        let state = establish(&link, Duration::from_secs(2), Duration::from_millis(10)).await;
        assert_eq!(state, LinkState::Up);
    }

    #[tokio::test]
    async fn test_reported_loss_triggers_reconnect() {
        let link = FakeLink::new(false);
        let supervisor = LinkSupervisor::spawn(link.clone(), LinkState::Up, &config());
        let handle = supervisor.handle();
        let mut rx = handle.watch();

        handle.report_lost();
        wait_for(&mut rx, LinkState::Down).await;
        assert_eq!(handle.state(), LinkState::Down);

        link.set_up(true);
        wait_for(&mut rx, LinkState::Up).await;

        supervisor.stop().await;
    }

    #[tokio::test]
    async fn test_probe_detects_silent_loss() {
        let link = FakeLink::new(true);
        let supervisor = LinkSupervisor::spawn(link.clone(), LinkState::Up, &config());
        let mut rx = supervisor.handle().watch();

        link.set_up(false);
        wait_for(&mut rx, LinkState::Down).await;

        link.set_up(true);
        wait_for(&mut rx, LinkState::Up).await;

        supervisor.stop().await;
    }

    #[tokio::test]
    async fn test_degraded_start_recovers() {
        let link = FakeLink::new(false);
        let supervisor = LinkSupervisor::spawn(link.clone(), LinkState::Down, &config());
        let mut rx = supervisor.handle().watch();

        sleep(Duration::from_millis(30)).await;
        assert_eq!(*rx.borrow(), LinkState::Down);

        link.set_up(true);
        wait_for(&mut rx, LinkState::Up).await;

        supervisor.stop().await;
    }
}
