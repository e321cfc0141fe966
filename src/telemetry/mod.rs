mod decoder;
mod error;
mod record;

pub use decoder::{decode, encode};
pub use error::DecodeError;
pub use record::TelemetryRecord;
