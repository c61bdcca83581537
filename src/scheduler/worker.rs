use crossbeam_channel::Receiver;
use crossbeam_deque::{Injector, Steal, Stealer, Worker as CbWorker};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::trace::{trace, warn};

/// A unit of work run by the pool.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Statistics for a worker.
#[derive(Debug, Default)]
pub struct WorkerStats {
    pub jobs_run: AtomicUsize,
    pub jobs_panicked: AtomicUsize,
    pub wakeups: AtomicUsize,
    pub steals_successful: AtomicUsize,
}

impl WorkerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_run(&self) {
        self.jobs_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panic(&self) {
        self.jobs_panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_wakeup(&self) {
        self.wakeups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_steal_success(&self) {
        self.steals_successful.fetch_add(1, Ordering::Relaxed);
    }
}

/// A pool thread's view of the queues.
///
/// Each queued job is paired with one doorbell token. A worker drains every
/// queue it can see before parking on the doorbell again, so a job is never
/// left queued while all workers sleep.
pub(crate) struct Worker {
    id: usize,
    local: CbWorker<Job>,
    injector: Arc<Injector<Job>>,
    stealers: Arc<Vec<Stealer<Job>>>,
    doorbell: Receiver<()>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        local: CbWorker<Job>,
        injector: Arc<Injector<Job>>,
        stealers: Arc<Vec<Stealer<Job>>>,
        doorbell: Receiver<()>,
        stats: Arc<WorkerStats>,
    ) -> Self {
        Self {
            id,
            local,
            injector,
            stealers,
            doorbell,
            stats,
        }
    }

    /// Local queue first, then the injector, then the other workers.
    pub(crate) fn find_job(&self) -> Option<Job> {
        if let Some(job) = self.local.pop() {
            return Some(job);
        }

        loop {
            match self.injector.steal_batch_and_pop(&self.local) {
                Steal::Success(job) => return Some(job),
                Steal::Retry => continue,
                Steal::Empty => break,
            }
        }

        for (i, stealer) in self.stealers.iter().enumerate() {
            if i == self.id {
                continue;
            }
            loop {
                match stealer.steal() {
                    Steal::Success(job) => {
                        self.stats.record_steal_success();
                        return Some(job);
                    }
                    Steal::Retry => continue,
                    Steal::Empty => break,
                }
            }
        }

        None
    }

    /// Run jobs until the doorbell is closed.
    pub(crate) fn run(self) {
        loop {
            while let Some(job) = self.find_job() {
                self.run_job(job);
            }
            match self.doorbell.recv() {
                Ok(()) => self.stats.record_wakeup(),
                Err(_) => break,
            }
        }
        trace!(worker = self.id, "worker exiting");
    }

    fn run_job(&self, job: Job) {
        if let Err(_payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            self.stats.record_panic();
            warn!(
                worker = self.id,
                message = %crate::task::panic_message(_payload.as_ref()),
                "job panicked"
            );
        }
        self.stats.record_run();
    }
}
