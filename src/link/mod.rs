mod error;
#[cfg(test)]
pub mod mock;
mod probe;
mod supervisor;

pub use error::LinkError;
pub use probe::{Link, TcpProbeLink};
pub use supervisor::{establish, LinkHandle, LinkState, LinkSupervisor};
