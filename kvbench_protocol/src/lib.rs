#[macro_use]
extern crate quick_error;

pub mod error;
pub mod reply;
pub mod request;

mod buffer;
mod message;
mod slice;

pub use reply::*;
pub use request::*;

pub use buffer::{ReadBuffer, WriteBuffer, DEFAULT_BUF_SIZE};
pub use error::{ProtocolError, Result};
pub use slice::Slice;
