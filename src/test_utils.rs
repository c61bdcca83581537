use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use smallvec::SmallVec;

use crate::formula::{Atom, Formula, Variable};
use crate::instance::{Instance, PositionedInstance, Side};
use crate::oracle::{Oracle, OracleError};
use crate::structure::{Example, GroundAtom, Structure};
use crate::vocabulary::{LogicBase, Predicate, PredicateDefinition, Type, Vocabulary};

/// One type `t` and the given predicates over it.
pub(crate) fn single_type(predicates: &[(&str, usize)]) -> (Type, Vec<Arc<Predicate>>) {
    let ty = Type::new("t");
    let predicates = predicates
        .iter()
        .map(|(name, arity)| Arc::new(Predicate::new(*name, vec![ty.clone(); *arity])))
        .collect();
    (ty, predicates)
}

pub(crate) fn instance(predicate: &Arc<Predicate>, indices: &[u32]) -> Instance {
    Instance::new(Arc::clone(predicate), indices.iter().copied()).expect("arity matches")
}

pub(crate) fn body(predicate: &Arc<Predicate>, indices: &[u32], index: usize) -> PositionedInstance {
    PositionedInstance::new(instance(predicate, indices), Side::Body, index)
}

pub(crate) fn head(predicate: &Arc<Predicate>, indices: &[u32], index: usize) -> PositionedInstance {
    PositionedInstance::new(instance(predicate, indices), Side::Head, index)
}

/// `body_pred(x0) => head_pred(x0)` over type `t`.
pub(crate) fn unary_formula(body_pred: &Arc<Predicate>, head_pred: &Arc<Predicate>) -> Formula {
    let x0 = Variable::new(0, body_pred.types()[0].clone());
    let atom = |p: &Arc<Predicate>| {
        let args: SmallVec<[Variable; 4]> = SmallVec::from_elem(x0.clone(), 1);
        Atom::new(Arc::clone(p), args)
    };
    Formula::horn(atom(head_pred), atom(body_pred))
}

/// A logic base with one example over `block`/`On`.
pub(crate) fn blocks_base() -> Arc<LogicBase> {
    let mut vocabulary = Vocabulary::new();
    let block = vocabulary.add_type(Type::new("block"));
    let on = vocabulary.add_predicate(Predicate::new("On", vec![block.clone(), block.clone()]));
    let clear = vocabulary.add_predicate(Predicate::new("Clear", vec![block]));
    let example = Example::new(vec![
        GroundAtom::new(Arc::clone(&on), ["a", "b"]),
        GroundAtom::new(Arc::clone(&clear), ["a"]),
    ]);
    let search = vec![PredicateDefinition::new(on), PredicateDefinition::new(clear)];
    Arc::new(LogicBase::new(Arc::new(vocabulary), vec![example], search).expect("valid example"))
}

/// Oracle stub that records every call and answers with `verdict`.
pub(crate) struct CountingOracle {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Formula>>,
    verdict: fn(&Formula) -> bool,
    delay: Duration,
    fail: bool,
}

impl CountingOracle {
    pub(crate) fn new(verdict: fn(&Formula) -> bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            verdict,
            delay: Duration::ZERO,
            fail: false,
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn failing() -> Self {
        let mut oracle = Self::new(|_| false);
        oracle.fail = true;
        oracle
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Oracle for CountingOracle {
    fn evaluate(
        &self,
        _vocabulary: &Vocabulary,
        _structures: &[Structure],
        formulas: &[Formula],
    ) -> Result<Vec<bool>, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.seen.lock().extend(formulas.iter().cloned());
        if self.fail {
            return Err(OracleError::Invocation("exit status 1".to_string()));
        }
        Ok(formulas.iter().map(self.verdict).collect())
    }
}

/// Valid iff some head atom also occurs in the body.
pub(crate) fn head_in_body(formula: &Formula) -> bool {
    formula.head().iter().any(|h| formula.body().contains(h))
}
