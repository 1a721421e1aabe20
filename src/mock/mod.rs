//! In-process stand-in for a RESP key-value server, for running the
//! benchmarks and the client without a live store.

mod mem_store;
mod server;

pub use mem_store::MemStore;
pub use server::MockServer;
