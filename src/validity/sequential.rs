use std::sync::Arc;

use hashbrown::{HashMap, HashSet};

use crate::formula::Formula;
use crate::metrics::CacheMetrics;
use crate::oracle::{evaluate_checked, Oracle};
use crate::trace::{debug, debug_span, trace, warn};
use crate::vocabulary::LogicBase;

use super::{FxBuildHasher, ValidityCache, ValidityError};

/// Single-threaded cache that batches every pending formula into one oracle
/// call.
///
/// A query for an unknown verdict pays for all outstanding submissions at
/// once. A formula queried without being submitted joins the batch first.
/// When the oracle fails the batch stays pending and the error is returned;
/// nothing is retried until the next query.
pub struct SequentialValidityCache {
    base: Arc<LogicBase>,
    oracle: Arc<dyn Oracle>,
    pending: Vec<Formula>,
    pending_set: HashSet<Formula, FxBuildHasher>,
    table: HashMap<Formula, bool, FxBuildHasher>,
    metrics: Arc<CacheMetrics>,
}

impl SequentialValidityCache {
    pub fn new(base: Arc<LogicBase>, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            base,
            oracle,
            pending: Vec::new(),
            pending_set: HashSet::default(),
            table: HashMap::default(),
            metrics: Arc::new(CacheMetrics::new()),
        }
    }

    pub fn base(&self) -> &Arc<LogicBase> {
        &self.base
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    /// Formulas waiting for the next flush, in submission order.
    pub fn pending(&self) -> &[Formula] {
        &self.pending
    }

    /// The memoized verdict, without triggering a flush.
    pub fn cached(&self, formula: &Formula) -> Option<bool> {
        self.table.get(formula).copied()
    }

    pub fn submit_formula(&mut self, formula: Formula) {
        self.metrics.record_submission();
        if self.table.contains_key(&formula) || self.pending_set.contains(&formula) {
            self.metrics.record_duplicate_submission();
            return;
        }
        debug!(formula = %formula, pending = self.pending.len() + 1, "submitted");
        self.pending_set.insert(formula.clone());
        self.pending.push(formula);
    }

    pub fn is_valid(&mut self, formula: &Formula) -> Result<bool, ValidityError> {
        if let Some(valid) = self.cached(formula) {
            self.metrics.record_memo_hit();
            return Ok(valid);
        }
        self.metrics.record_memo_miss();
        if !self.pending_set.contains(formula) {
            self.submit_formula(formula.clone());
        }
        self.flush()?;
        self.cached(formula)
            .ok_or_else(|| ValidityError::NotSubmitted(formula.clone()))
    }

    /// Evaluate every pending formula in one oracle call.
    pub fn flush(&mut self) -> Result<(), ValidityError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let _span = debug_span!("validity_flush", formulas = self.pending.len()).entered();
        debug!(
            structures = self.base.structures().len(),
            "flushing validity batch"
        );
        self.metrics.record_oracle_call(self.pending.len());
        let verdicts = match evaluate_checked(
            self.oracle.as_ref(),
            self.base.vocabulary(),
            self.base.structures(),
            &self.pending,
        ) {
            Ok(verdicts) => verdicts,
            Err(err) => {
                self.metrics.record_oracle_failure();
                warn!(error = %err, formulas = self.pending.len(), "validity batch failed");
                return Err(err.into());
            }
        };
        for (formula, valid) in self.pending.drain(..).zip(verdicts) {
            trace!(formula = %formula, valid, "verdict");
            self.table.insert(formula, valid);
        }
        self.pending_set.clear();
        Ok(())
    }
}

impl ValidityCache for SequentialValidityCache {
    fn submit_formula(&mut self, formula: Formula) {
        SequentialValidityCache::submit_formula(self, formula)
    }

    fn is_valid(&mut self, formula: &Formula) -> Result<bool, ValidityError> {
        SequentialValidityCache::is_valid(self, formula)
    }

    fn len(&self) -> usize {
        self.table.len() + self.pending.len()
    }
}

#[cfg(test)]
#[path = "../tests/sequential.rs"]
mod tests;
