#[macro_use]
extern crate quick_error;

pub mod bench;
pub mod config;
pub mod mock;

mod error;

pub use bench::sequential::{SequentialBench, SequentialReport};
pub use bench::timer::{Timer, TimerBench, TimerCommand, TimerReport};
pub use bench::{Clock, SystemClock};
pub use error::{BenchError, Result};
pub use kvbench_protocol::Slice;
pub use mock::{MemStore, MockServer};
