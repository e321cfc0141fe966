mod channel;
mod error;
mod frame;
#[cfg(test)]
pub mod mock;
mod receiver;

pub use channel::{open_port, SerialChannel};
pub use error::RadioError;
pub use frame::RadioFrame;
pub use receiver::{FrameMode, Receiver};
