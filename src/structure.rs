//! Examples and the background structures derived from them.

use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use rustc_hash::FxHasher;

use crate::vocabulary::{Predicate, Type, Vocabulary};

type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;
type FxHashSet<T> = HashSet<T, BuildHasherDefault<FxHasher>>;

/// Error raised when an example does not fit its vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleError {
    UnknownPredicate(String),
    ArityMismatch {
        predicate: String,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for ExampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExampleError::UnknownPredicate(name) => {
                write!(f, "example uses predicate {} outside the vocabulary", name)
            }
            ExampleError::ArityMismatch {
                predicate,
                expected,
                got,
            } => write!(
                f,
                "example atom {} has {} arguments, expected {}",
                predicate, got, expected
            ),
        }
    }
}

impl std::error::Error for ExampleError {}

/// A predicate applied to constants.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroundAtom {
    predicate: Arc<Predicate>,
    args: Vec<String>,
}

impl GroundAtom {
    pub fn new<S: Into<String>>(predicate: Arc<Predicate>, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            predicate,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn predicate(&self) -> &Arc<Predicate> {
        &self.predicate
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// One observed world: the facts that hold in it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Example {
    atoms: Vec<GroundAtom>,
}

impl Example {
    pub fn new(atoms: Vec<GroundAtom>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[GroundAtom] {
        &self.atoms
    }

    /// Interpret this example over `vocabulary`.
    ///
    /// A constant belongs to the type of every parameter position it occurs
    /// in. Types and predicates without any facts are listed with empty
    /// extensions so the structure is total over the vocabulary.
    pub fn structure(&self, vocabulary: &Vocabulary) -> Result<Structure, ExampleError> {
        let mut domains: Vec<(Type, Vec<String>)> = vocabulary
            .types()
            .iter()
            .map(|ty| (ty.clone(), Vec::new()))
            .collect();
        let mut relations: Vec<(Arc<Predicate>, Vec<Vec<String>>)> = vocabulary
            .predicates()
            .iter()
            .map(|p| (Arc::clone(p), Vec::new()))
            .collect();

        let mut domain_slots: FxHashMap<Type, usize> = FxHashMap::default();
        for (slot, (ty, _)) in domains.iter().enumerate() {
            domain_slots.entry(ty.clone()).or_insert(slot);
        }
        let mut relation_slots: FxHashMap<Arc<Predicate>, usize> = FxHashMap::default();
        for (slot, (predicate, _)) in relations.iter().enumerate() {
            relation_slots.entry(Arc::clone(predicate)).or_insert(slot);
        }
        let mut seen_tuples: FxHashSet<(usize, &[String])> = FxHashSet::default();
        let mut seen_constants: FxHashSet<(usize, &str)> = FxHashSet::default();

        for atom in &self.atoms {
            let predicate = atom.predicate();
            let Some(&relation) = relation_slots.get(predicate) else {
                return Err(ExampleError::UnknownPredicate(predicate.name().to_string()));
            };
            if atom.args.len() != predicate.arity() {
                return Err(ExampleError::ArityMismatch {
                    predicate: predicate.name().to_string(),
                    expected: predicate.arity(),
                    got: atom.args.len(),
                });
            }
            if seen_tuples.insert((relation, atom.args.as_slice())) {
                relations[relation].1.push(atom.args.clone());
            }
            for (constant, ty) in atom.args.iter().zip(predicate.types()) {
                let domain = match domain_slots.get(ty) {
                    Some(&slot) => slot,
                    None => {
                        domains.push((ty.clone(), Vec::new()));
                        domain_slots.insert(ty.clone(), domains.len() - 1);
                        domains.len() - 1
                    }
                };
                if seen_constants.insert((domain, constant.as_str())) {
                    domains[domain].1.push(constant.clone());
                }
            }
        }

        Ok(Structure { domains, relations })
    }
}

/// Full interpretation of one example: constants per type and the tuples of
/// every predicate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Structure {
    domains: Vec<(Type, Vec<String>)>,
    relations: Vec<(Arc<Predicate>, Vec<Vec<String>>)>,
}

impl Structure {
    pub fn domains(&self) -> &[(Type, Vec<String>)] {
        &self.domains
    }

    pub fn relations(&self) -> &[(Arc<Predicate>, Vec<Vec<String>>)] {
        &self.relations
    }

    pub fn domain(&self, ty: &Type) -> Option<&[String]> {
        self.domains
            .iter()
            .find(|(t, _)| t == ty)
            .map(|(_, constants)| constants.as_slice())
    }

    pub fn relation(&self, predicate: &Predicate) -> Option<&[Vec<String>]> {
        self.relations
            .iter()
            .find(|(p, _)| **p == *predicate)
            .map(|(_, tuples)| tuples.as_slice())
    }
}

#[cfg(test)]
#[path = "tests/structure.rs"]
mod tests;
