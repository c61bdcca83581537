//! Memoized access to the validity oracle.
//!
//! [`SequentialValidityCache`] collects submitted formulas and evaluates them
//! all in one oracle call the first time an unknown verdict is needed.
//! [`ParallelValidityCache`] starts one oracle call per formula on a worker
//! pool as soon as it is submitted. Either way each distinct formula reaches
//! the oracle at most once.

pub mod parallel;
pub mod sequential;

pub use parallel::ParallelValidityCache;
pub use sequential::SequentialValidityCache;

use std::fmt;
use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

use crate::formula::Formula;
use crate::oracle::OracleError;

pub(crate) type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Error answering a validity query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidityError {
    /// The formula was queried on a cache that requires submission first.
    NotSubmitted(Formula),
    /// The oracle call responsible for the formula failed.
    Oracle(OracleError),
}

impl fmt::Display for ValidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidityError::NotSubmitted(formula) => {
                write!(f, "validity of {} queried before it was submitted", formula)
            }
            ValidityError::Oracle(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ValidityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValidityError::NotSubmitted(_) => None,
            ValidityError::Oracle(err) => Some(err),
        }
    }
}

impl From<OracleError> for ValidityError {
    fn from(err: OracleError) -> Self {
        ValidityError::Oracle(err)
    }
}

/// Common interface of the validity caches.
pub trait ValidityCache {
    /// Announce that the validity of `formula` will be asked for.
    fn submit_formula(&mut self, formula: Formula);

    /// Whether `formula` holds in every background structure.
    fn is_valid(&mut self, formula: &Formula) -> Result<bool, ValidityError>;

    /// Number of distinct formulas the cache knows about.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
