//! Counters for validity cache traffic.
//!
//! Both caches record into a [`CacheMetrics`]; [`CacheMetrics::report`] takes a
//! plain snapshot for logging or assertions.
//!
//! ```rust,ignore
//! let report = cache.metrics().report();
//! println!("{}", report);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated with relaxed ordering.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Calls to `submit_formula`
    pub submissions: AtomicU64,
    /// Submissions of a formula already memoized, pending or scheduled
    pub duplicate_submissions: AtomicU64,
    /// `is_valid` calls answered from the memo table
    pub memo_hits: AtomicU64,
    /// `is_valid` calls that had to wait for or trigger an oracle call
    pub memo_misses: AtomicU64,
    /// Oracle invocations
    pub oracle_calls: AtomicU64,
    /// Formulas sent to the oracle, summed over invocations
    pub formulas_evaluated: AtomicU64,
    /// Oracle invocations that failed
    pub oracle_failures: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_submission(&self) {
        self.submissions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_duplicate_submission(&self) {
        self.duplicate_submissions.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_memo_hit(&self) {
        self.memo_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_memo_miss(&self) {
        self.memo_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one oracle invocation covering `formulas` formulas.
    #[inline]
    pub fn record_oracle_call(&self, formulas: usize) {
        self.oracle_calls.fetch_add(1, Ordering::Relaxed);
        self.formulas_evaluated
            .fetch_add(formulas as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_oracle_failure(&self) {
        self.oracle_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            submissions: self.submissions.load(Ordering::Relaxed),
            duplicate_submissions: self.duplicate_submissions.load(Ordering::Relaxed),
            memo_hits: self.memo_hits.load(Ordering::Relaxed),
            memo_misses: self.memo_misses.load(Ordering::Relaxed),
            oracle_calls: self.oracle_calls.load(Ordering::Relaxed),
            formulas_evaluated: self.formulas_evaluated.load(Ordering::Relaxed),
            oracle_failures: self.oracle_failures.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.submissions.store(0, Ordering::Relaxed);
        self.duplicate_submissions.store(0, Ordering::Relaxed);
        self.memo_hits.store(0, Ordering::Relaxed);
        self.memo_misses.store(0, Ordering::Relaxed);
        self.oracle_calls.store(0, Ordering::Relaxed);
        self.formulas_evaluated.store(0, Ordering::Relaxed);
        self.oracle_failures.store(0, Ordering::Relaxed);
    }
}

/// Snapshot of [`CacheMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsReport {
    pub submissions: u64,
    pub duplicate_submissions: u64,
    pub memo_hits: u64,
    pub memo_misses: u64,
    pub oracle_calls: u64,
    pub formulas_evaluated: u64,
    pub oracle_failures: u64,
}

impl MetricsReport {
    /// Fraction of `is_valid` calls served from the memo table.
    pub fn hit_rate(&self) -> f64 {
        let total = self.memo_hits + self.memo_misses;
        if total == 0 {
            1.0
        } else {
            self.memo_hits as f64 / total as f64
        }
    }

    /// Average batch size per oracle invocation.
    pub fn formulas_per_call(&self) -> f64 {
        if self.oracle_calls == 0 {
            0.0
        } else {
            self.formulas_evaluated as f64 / self.oracle_calls as f64
        }
    }
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Validity Cache Metrics ===")?;
        writeln!(
            f,
            "Submissions:        {} ({} duplicates)",
            self.submissions, self.duplicate_submissions
        )?;
        writeln!(
            f,
            "Lookups:            {} hits, {} misses ({:.1}% hit rate)",
            self.memo_hits,
            self.memo_misses,
            self.hit_rate() * 100.0
        )?;
        writeln!(
            f,
            "Oracle calls:       {} ({} formulas, {:.1} per call, {} failed)",
            self.oracle_calls,
            self.formulas_evaluated,
            self.formulas_per_call(),
            self.oracle_failures
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/metrics.rs"]
mod tests;
