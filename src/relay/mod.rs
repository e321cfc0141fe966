mod body;
mod dispatcher;
mod endpoint;
mod error;
#[cfg(test)]
pub mod mock;
mod transport;

pub use body::encode_body;
pub use dispatcher::Dispatcher;
pub use endpoint::{default_endpoints, Endpoint, Field};
pub use error::DeliveryError;
pub use transport::{HttpTransport, Transport};
