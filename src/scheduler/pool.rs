use crossbeam_channel::Sender;
use crossbeam_deque::{Injector, Worker as CbWorker};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::task::{panic_message, TaskFailed, TaskHandle};
use crate::trace::debug;

use super::worker::{Job, Worker, WorkerStats};

/// Number of oracle invocations allowed to run at once by default.
pub const DEFAULT_WORKERS: usize = 8;

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub num_workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_WORKERS,
        }
    }
}

/// Pool-wide statistics.
#[derive(Debug, Default)]
pub struct PoolStats {
    pub jobs_submitted: AtomicUsize,
}

impl PoolStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&self) {
        self.jobs_submitted.fetch_add(1, Ordering::Relaxed);
    }
}

/// A fixed-size pool of worker threads.
///
/// Jobs go into a global injector; idle workers park on a channel and are
/// woken by one token per job. Dropping the pool closes the channel, lets the
/// workers finish everything still queued, and joins them.
pub struct WorkerPool {
    injector: Arc<Injector<Job>>,
    doorbell: Option<Sender<()>>,
    threads: Vec<JoinHandle<()>>,
    workers: Vec<Arc<WorkerStats>>,
    stats: Arc<PoolStats>,
    config: PoolConfig,
}

impl WorkerPool {
    /// Create a pool with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a pool and start its workers.
    pub fn with_config(config: PoolConfig) -> Self {
        let num_workers = config.num_workers.max(1);
        let injector = Arc::new(Injector::new());
        let (doorbell, rx) = crossbeam_channel::unbounded();

        let locals: Vec<CbWorker<Job>> = (0..num_workers).map(|_| CbWorker::new_fifo()).collect();
        let stealers = Arc::new(locals.iter().map(CbWorker::stealer).collect::<Vec<_>>());

        let mut threads = Vec::with_capacity(num_workers);
        let mut workers = Vec::with_capacity(num_workers);
        for (id, local) in locals.into_iter().enumerate() {
            let stats = Arc::new(WorkerStats::new());
            workers.push(Arc::clone(&stats));
            let worker = Worker::new(
                id,
                local,
                Arc::clone(&injector),
                Arc::clone(&stealers),
                rx.clone(),
                stats,
            );
            threads.push(thread::spawn(move || worker.run()));
        }
        debug!(workers = num_workers, "worker pool started");

        Self {
            injector,
            doorbell: Some(doorbell),
            threads,
            workers,
            stats: Arc::new(PoolStats::new()),
            config,
        }
    }

    /// Queue a job.
    pub fn execute<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.injector.push(Box::new(job));
        self.stats.record_submitted();
        if let Some(doorbell) = &self.doorbell {
            let _ = doorbell.send(());
        }
    }

    /// Queue `f` and return a handle to its result. A panic in `f` is
    /// reported through the handle instead of unwinding the worker.
    pub fn spawn<T, F>(&self, f: F) -> TaskHandle<T>
    where
        T: Clone + Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (handle, completer) = TaskHandle::pending();
        self.execute(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f))
                .map_err(|payload| TaskFailed::Panicked(panic_message(payload.as_ref())));
            completer.complete(result);
        });
        handle
    }

    /// Get the number of workers.
    pub fn num_workers(&self) -> usize {
        self.threads.len()
    }

    /// Get configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Get pool statistics.
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Jobs run and jobs that panicked, summed over all workers.
    pub fn aggregate_worker_stats(&self) -> (usize, usize) {
        let mut run = 0;
        let mut panicked = 0;
        for worker in &self.workers {
            run += worker.jobs_run.load(Ordering::Relaxed);
            panicked += worker.jobs_panicked.load(Ordering::Relaxed);
        }
        (run, panicked)
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.doorbell.take();
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_workers", &self.threads.len())
            .field("queued", &!self.injector.is_empty())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/pool.rs"]
mod tests;
