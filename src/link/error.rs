use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("cannot resolve {address}: {source}")]
    Resolve {
        address: String,
        source: std::io::Error,
    },
    #[error("{address} unreachable: {source}")]
    Unreachable {
        address: String,
        source: std::io::Error,
    },
    #[error("probe task failed: {0}")]
    Task(String),
}
