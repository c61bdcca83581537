//! Interface to the external validity oracle.
//!
//! The oracle decides whether formulas hold in every background structure.
//! Nothing in this crate computes validity itself; the caches in
//! [`crate::validity`] only decide when and how often to ask.

use std::fmt;

use crate::formula::Formula;
use crate::structure::Structure;
use crate::vocabulary::Vocabulary;

/// Failure reported by, or while talking to, the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle could not be run (process failure, I/O, bad exit status).
    Invocation(String),
    /// The oracle answered something other than a verdict.
    MalformedOutput(String),
    /// The oracle returned a different number of verdicts than formulas.
    VerdictCount { expected: usize, got: usize },
    /// The oracle panicked inside a worker.
    Panicked(String),
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleError::Invocation(msg) => write!(f, "oracle invocation failed: {}", msg),
            OracleError::MalformedOutput(line) => {
                write!(f, "malformed oracle output: {:?}", line)
            }
            OracleError::VerdictCount { expected, got } => write!(
                f,
                "oracle returned {} verdicts for {} formulas",
                got, expected
            ),
            OracleError::Panicked(msg) => write!(f, "oracle panicked: {}", msg),
        }
    }
}

impl std::error::Error for OracleError {}

/// Decides validity of formulas against background structures.
///
/// Implementations must return one verdict per formula, in order, where a
/// verdict is true iff the formula holds in every structure. They are called
/// concurrently from pool workers, so they must be `Send + Sync`.
pub trait Oracle: Send + Sync {
    fn evaluate(
        &self,
        vocabulary: &Vocabulary,
        structures: &[Structure],
        formulas: &[Formula],
    ) -> Result<Vec<bool>, OracleError>;
}

impl<O: Oracle + ?Sized> Oracle for std::sync::Arc<O> {
    fn evaluate(
        &self,
        vocabulary: &Vocabulary,
        structures: &[Structure],
        formulas: &[Formula],
    ) -> Result<Vec<bool>, OracleError> {
        (**self).evaluate(vocabulary, structures, formulas)
    }
}

/// Parse `YES`/`NO` verdict lines as printed by a process-backed oracle.
///
/// Blank lines are skipped; surrounding whitespace is ignored.
pub fn parse_verdicts(output: &str) -> Result<Vec<bool>, OracleError> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line {
            "YES" => Ok(true),
            "NO" => Ok(false),
            other => Err(OracleError::MalformedOutput(other.to_string())),
        })
        .collect()
}

/// Run `oracle` and check that it answered every formula.
pub(crate) fn evaluate_checked(
    oracle: &dyn Oracle,
    vocabulary: &Vocabulary,
    structures: &[Structure],
    formulas: &[Formula],
) -> Result<Vec<bool>, OracleError> {
    let verdicts = oracle.evaluate(vocabulary, structures, formulas)?;
    if verdicts.len() != formulas.len() {
        return Err(OracleError::VerdictCount {
            expected: formulas.len(),
            got: verdicts.len(),
        });
    }
    Ok(verdicts)
}

#[cfg(test)]
#[path = "tests/oracle.rs"]
mod tests;
