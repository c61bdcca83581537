use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::formula::Formula;
use crate::metrics::CacheMetrics;
use crate::oracle::{evaluate_checked, Oracle, OracleError};
use crate::scheduler::{PoolConfig, WorkerPool};
use crate::task::{TaskFailed, TaskHandle};
use crate::trace::{debug, trace, warn};
use crate::vocabulary::LogicBase;

use super::{FxBuildHasher, ValidityCache, ValidityError};

type Verdict = Result<bool, OracleError>;

/// Cache that evaluates each submitted formula on its own, in parallel.
///
/// Submitting schedules one oracle call for that formula alone on the worker
/// pool; querying blocks until that call is done. The table entry is created
/// with an atomic get-or-insert, so concurrent submissions of one formula
/// schedule a single call. Querying a formula that was never submitted is an
/// error. Failed calls are not retried.
pub struct ParallelValidityCache {
    base: Arc<LogicBase>,
    oracle: Arc<dyn Oracle>,
    table: DashMap<Formula, TaskHandle<Verdict>, FxBuildHasher>,
    pool: WorkerPool,
    metrics: Arc<CacheMetrics>,
}

impl ParallelValidityCache {
    /// Create a cache backed by a pool of the default size.
    pub fn new(base: Arc<LogicBase>, oracle: Arc<dyn Oracle>) -> Self {
        Self::with_config(base, oracle, PoolConfig::default())
    }

    pub fn with_config(base: Arc<LogicBase>, oracle: Arc<dyn Oracle>, config: PoolConfig) -> Self {
        Self {
            base,
            oracle,
            table: DashMap::with_hasher(FxBuildHasher::default()),
            pool: WorkerPool::with_config(config),
            metrics: Arc::new(CacheMetrics::new()),
        }
    }

    pub fn base(&self) -> &Arc<LogicBase> {
        &self.base
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn contains(&self, formula: &Formula) -> bool {
        self.table.contains_key(formula)
    }

    /// Schedule the oracle call for `formula` unless one already exists.
    pub fn submit_formula(&self, formula: Formula) {
        self.metrics.record_submission();
        match self.table.entry(formula) {
            Entry::Occupied(_) => self.metrics.record_duplicate_submission(),
            Entry::Vacant(vacant) => {
                debug!(formula = %vacant.key(), "scheduling validity check");
                let handle = self.schedule(vacant.key().clone());
                vacant.insert(handle);
            }
        }
    }

    /// Block until the verdict for `formula` is available.
    pub fn is_valid(&self, formula: &Formula) -> Result<bool, ValidityError> {
        let handle = match self.table.get(formula) {
            Some(entry) => entry.value().clone(),
            None => return Err(ValidityError::NotSubmitted(formula.clone())),
        };
        if handle.is_finished() {
            self.metrics.record_memo_hit();
        } else {
            self.metrics.record_memo_miss();
        }
        match handle.wait() {
            Ok(verdict) => verdict.map_err(ValidityError::from),
            Err(failed) => Err(ValidityError::Oracle(task_failure(failed))),
        }
    }

    fn schedule(&self, formula: Formula) -> TaskHandle<Verdict> {
        let base = Arc::clone(&self.base);
        let oracle = Arc::clone(&self.oracle);
        let metrics = Arc::clone(&self.metrics);
        self.pool.spawn(move || {
            metrics.record_oracle_call(1);
            trace!(formula = %formula, "oracle call");
            let verdict = evaluate_checked(
                oracle.as_ref(),
                base.vocabulary(),
                base.structures(),
                std::slice::from_ref(&formula),
            )
            .and_then(|verdicts| {
                verdicts
                    .first()
                    .copied()
                    .ok_or(OracleError::VerdictCount { expected: 1, got: 0 })
            });
            if let Err(_err) = &verdict {
                metrics.record_oracle_failure();
                warn!(formula = %formula, error = %_err, "validity check failed");
            }
            verdict
        })
    }
}

fn task_failure(failed: TaskFailed) -> OracleError {
    match failed {
        TaskFailed::Panicked(msg) => OracleError::Panicked(msg),
        TaskFailed::Abandoned => {
            OracleError::Invocation("validity check was dropped before it ran".to_string())
        }
    }
}

impl ValidityCache for ParallelValidityCache {
    fn submit_formula(&mut self, formula: Formula) {
        ParallelValidityCache::submit_formula(self, formula)
    }

    fn is_valid(&mut self, formula: &Formula) -> Result<bool, ValidityError> {
        ParallelValidityCache::is_valid(self, formula)
    }

    fn len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
#[path = "../tests/parallel.rs"]
mod tests;
