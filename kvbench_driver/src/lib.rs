#[macro_use]
extern crate quick_error;

mod client;
mod commands;
mod error;

pub use client::KvClient;
pub use commands::Commands;
pub use error::{ClientError, Result};
