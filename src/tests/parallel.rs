use super::*;
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use crate::structure::Structure;
use crate::test_utils::{blocks_base, head_in_body, single_type, unary_formula, CountingOracle};
use crate::vocabulary::Vocabulary;

fn formulas() -> Vec<Formula> {
    let (_, preds) = single_type(&[("P", 1), ("Q", 1), ("S", 1)]);
    let mut formulas = Vec::new();
    for body in &preds {
        for head in &preds {
            formulas.push(unary_formula(body, head));
        }
    }
    formulas
}

fn cache(oracle: &Arc<CountingOracle>, workers: usize) -> ParallelValidityCache {
    ParallelValidityCache::with_config(
        blocks_base(),
        oracle.clone(),
        PoolConfig {
            num_workers: workers,
        },
    )
}

#[test]
fn each_formula_is_evaluated_once() {
    let oracle = Arc::new(CountingOracle::new(head_in_body));
    let cache = cache(&oracle, 4);
    let formulas = formulas();

    for formula in &formulas {
        cache.submit_formula(formula.clone());
    }
    for formula in &formulas {
        assert_eq!(cache.is_valid(formula), Ok(head_in_body(formula)));
    }
    for formula in &formulas {
        assert_eq!(cache.is_valid(formula), Ok(head_in_body(formula)));
    }

    assert_eq!(oracle.calls(), formulas.len());
    let seen = oracle.seen.lock();
    for formula in &formulas {
        assert_eq!(seen.iter().filter(|f| *f == formula).count(), 1);
    }
    let report = cache.metrics().report();
    assert_eq!(report.oracle_calls, formulas.len() as u64);
    assert_eq!(report.formulas_evaluated, formulas.len() as u64);
}

#[test]
fn unsubmitted_query_is_an_error() {
    let oracle = Arc::new(CountingOracle::new(head_in_body));
    let cache = cache(&oracle, 1);
    let formula = formulas().remove(1);
    assert_eq!(
        cache.is_valid(&formula),
        Err(ValidityError::NotSubmitted(formula.clone()))
    );
    assert!(!cache.contains(&formula));
    assert_eq!(oracle.calls(), 0);
}

#[test]
fn resubmission_does_not_call_again() {
    let oracle = Arc::new(CountingOracle::new(head_in_body));
    let cache = cache(&oracle, 2);
    let formula = formulas().remove(1);

    cache.submit_formula(formula.clone());
    assert_eq!(cache.is_valid(&formula), Ok(false));
    cache.submit_formula(formula.clone());
    assert_eq!(cache.is_valid(&formula), Ok(false));
    assert_eq!(oracle.calls(), 1);
    assert_eq!(cache.metrics().report().duplicate_submissions, 1);
}

#[test]
fn concurrent_submissions_share_one_call() {
    let oracle = Arc::new(CountingOracle::new(head_in_body).with_delay(Duration::from_millis(50)));
    let cache = cache(&oracle, 4);
    let formula = formulas().remove(4);
    let start = Barrier::new(2);

    let verdicts: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    start.wait();
                    cache.submit_formula(formula.clone());
                    cache.is_valid(&formula)
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(verdicts, vec![Ok(true), Ok(true)]);
    assert_eq!(oracle.calls(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn failure_is_reported_and_not_retried() {
    let oracle = Arc::new(CountingOracle::failing());
    let cache = cache(&oracle, 2);
    let formula = formulas().remove(0);

    cache.submit_formula(formula.clone());
    for _ in 0..2 {
        assert!(matches!(
            cache.is_valid(&formula),
            Err(ValidityError::Oracle(OracleError::Invocation(_)))
        ));
    }
    assert_eq!(oracle.calls(), 1);
    assert_eq!(cache.metrics().report().oracle_failures, 1);
}

struct Crashing;

impl Oracle for Crashing {
    fn evaluate(
        &self,
        _vocabulary: &Vocabulary,
        _structures: &[Structure],
        _formulas: &[Formula],
    ) -> Result<Vec<bool>, OracleError> {
        panic!("solver crashed")
    }
}

#[test]
fn oracle_panic_becomes_an_error() {
    let cache = ParallelValidityCache::new(blocks_base(), Arc::new(Crashing));
    let formula = formulas().remove(0);
    cache.submit_formula(formula.clone());
    assert_eq!(
        cache.is_valid(&formula),
        Err(ValidityError::Oracle(OracleError::Panicked(
            "solver crashed".to_string()
        )))
    );
    assert_eq!(cache.pool().num_workers(), 8);
}

#[test]
fn usable_through_the_trait() {
    let oracle = Arc::new(CountingOracle::new(head_in_body));
    let mut cache = cache(&oracle, 2);
    let formulas = formulas();
    let cache: &mut dyn ValidityCache = &mut cache;

    assert!(cache.is_empty());
    for formula in &formulas {
        cache.submit_formula(formula.clone());
    }
    assert_eq!(cache.len(), formulas.len());
    assert_eq!(cache.is_valid(&formulas[0]), Ok(true));
}
