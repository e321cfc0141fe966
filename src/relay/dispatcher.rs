use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use super::body::encode_body;
use super::endpoint::Endpoint;
use super::error::DeliveryError;
use super::transport::Transport;
use crate::config::{BackendConfig, MAX_IN_FLIGHT};
use crate::link::{LinkHandle, LinkState};
use crate::telemetry::TelemetryRecord;

/// Result of one delivery attempt to one endpoint.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub endpoint: String,
    pub result: Result<u16, DeliveryError>,
}

/// Forwards decoded records to the backend, one task per record.
///
/// At most `max_in_flight` tasks run at once. `dispatch` waits for a free
/// slot, so a slow backend holds up the receive loop instead of piling up
/// tasks.
pub struct Dispatcher {
    endpoints: Arc<[Endpoint]>,
    backend: Arc<BackendConfig>,
    transport: Arc<dyn Transport>,
    permits: Arc<Semaphore>,
    max_in_flight: usize,
    link: LinkHandle,
}

impl Dispatcher {
    pub fn new(
        endpoints: Vec<Endpoint>,
        backend: BackendConfig,
        transport: Arc<dyn Transport>,
        max_in_flight: usize,
        link: LinkHandle,
    ) -> Self {
        let max_in_flight = max_in_flight.clamp(1, MAX_IN_FLIGHT);
        Self {
            endpoints: endpoints.into(),
            backend: Arc::new(backend),
            transport,
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            link,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.max_in_flight - self.permits.available_permits()
    }

    /// Starts delivering `record` to every endpoint. The record moves into the
    /// task; nothing else can observe or change it.
    pub async fn dispatch(
        &self,
        record: TelemetryRecord,
    ) -> JoinHandle<Vec<DeliveryOutcome>> {
        if self.permits.available_permits() == 0 {
            log::warn!(
                "All {} dispatch slots busy, waiting for backend",
                self.max_in_flight
            );
        }
        // The semaphore is never closed.
        let permit = self.permits.clone().acquire_owned().await.ok();

        let endpoints = self.endpoints.clone();
        let backend = self.backend.clone();
        let transport = self.transport.clone();
        let link = self.link.clone();

        tokio::spawn(async move {
            let outcomes = deliver_all(&endpoints, &backend, transport, &link, &record).await;
            drop(permit);
            outcomes
        })
    }

    /// Waits for every in-flight dispatch to finish.
    pub async fn drain(&self) {
        let total = u32::try_from(self.max_in_flight).unwrap_or(u32::MAX);
        if let Ok(all) = self.permits.acquire_many(total).await {
            drop(all);
        }
    }
}

async fn deliver_all(
    endpoints: &[Endpoint],
    backend: &BackendConfig,
    transport: Arc<dyn Transport>,
    link: &LinkHandle,
    record: &TelemetryRecord,
) -> Vec<DeliveryOutcome> {
    let mut outcomes = Vec::with_capacity(endpoints.len());

    for endpoint in endpoints {
        let url = backend.endpoint_url(&endpoint.name);
        let result = match encode_body(endpoint, record) {
            Ok(body) => post(transport.clone(), url, body).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(status) => log::info!("POST /{} status = {}", endpoint.name, status),
            Err(e) => {
                log::error!("POST /{} failed: {}", endpoint.name, e);
                if e.is_transport() && link.state() == LinkState::Up {
                    link.report_lost();
                }
            }
        }

        outcomes.push(DeliveryOutcome {
            endpoint: endpoint.name.clone(),
            result,
        });
    }

    outcomes
}

async fn post(
    transport: Arc<dyn Transport>,
    url: String,
    body: String,
) -> Result<u16, DeliveryError> {
    tokio::task::spawn_blocking(move || transport.post(&url, &body))
        .await
        .unwrap_or_else(|e| Err(DeliveryError::Transport(e.to_string())))
}
