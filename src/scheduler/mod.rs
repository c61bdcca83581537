//! Worker pool that runs oracle invocations off the search thread.

pub mod pool;
pub mod worker;

pub use pool::{PoolConfig, PoolStats, WorkerPool, DEFAULT_WORKERS};
pub use worker::WorkerStats;
