//! Clausal search-state engine for inductive clause discovery.
//!
//! Clauses are grown one positioned atom at a time ([`clause::StatusClause`]),
//! with typing tracked by a persistent [`environment::Environment`] and
//! symmetric duplicates pruned by canonicalization. Finished clauses become
//! [`formula::Formula`]s whose validity over the example structures is asked
//! of an external [`oracle::Oracle`] through a memoizing cache in
//! [`validity`].

pub mod clause;
pub mod environment;
pub mod formula;
pub mod instance;
pub mod metrics;
pub mod oracle;
pub mod scheduler;
pub mod structure;
pub mod task;
pub mod trace;
pub mod validity;
pub mod vocabulary;

#[cfg(test)]
pub(crate) mod test_utils;

pub use clause::StatusClause;
pub use environment::{Environment, EnvironmentError};
pub use formula::{Atom, Formula, Variable};
pub use instance::{Instance, InstanceError, InstanceList, PositionedInstance, Side};
pub use oracle::{Oracle, OracleError};
pub use structure::{Example, ExampleError, GroundAtom, Structure};
pub use validity::{ParallelValidityCache, SequentialValidityCache, ValidityCache, ValidityError};
pub use vocabulary::{LogicBase, Predicate, PredicateDefinition, Type, Vocabulary};
