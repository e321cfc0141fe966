use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("backend answered with status {0}")]
    Status(u16),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DeliveryError {
    /// Whether the failure points at the network rather than the backend.
    pub fn is_transport(&self) -> bool {
        matches!(self, DeliveryError::Transport(_))
    }
}
