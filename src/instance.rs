//! Atoms over variable indices and the ordered universe they are drawn from.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::sync::Arc;

use hashbrown::HashMap;
use rustc_hash::FxHasher;
use smallvec::SmallVec;

use crate::vocabulary::Predicate;

pub type Indices = SmallVec<[u32; 4]>;

type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Error building an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    ArityMismatch {
        predicate: String,
        arity: usize,
        indices: usize,
    },
}

impl fmt::Display for InstanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceError::ArityMismatch {
                predicate,
                arity,
                indices,
            } => write!(
                f,
                "{} has arity {} but was given {} variable indices",
                predicate, arity, indices
            ),
        }
    }
}

impl std::error::Error for InstanceError {}

/// A predicate applied to variable indices.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Instance {
    predicate: Arc<Predicate>,
    indices: Indices,
}

impl Instance {
    pub fn new(
        predicate: Arc<Predicate>,
        indices: impl IntoIterator<Item = u32>,
    ) -> Result<Self, InstanceError> {
        let indices: Indices = indices.into_iter().collect();
        if indices.len() != predicate.arity() {
            return Err(InstanceError::ArityMismatch {
                predicate: predicate.name().to_string(),
                arity: predicate.arity(),
                indices: indices.len(),
            });
        }
        Ok(Self { predicate, indices })
    }

    pub fn predicate(&self) -> &Arc<Predicate> {
        &self.predicate
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Largest variable index used, `None` for a nullary atom.
    pub fn max(&self) -> Option<u32> {
        self.indices.iter().copied().max()
    }

    /// Same predicate, every index passed through `rename`.
    pub fn renamed(&self, rename: impl Fn(u32) -> u32) -> Instance {
        Instance {
            predicate: Arc::clone(&self.predicate),
            indices: self.indices.iter().map(|&i| rename(i)).collect(),
        }
    }

    /// Predicate order, then the variable pattern lexicographically.
    pub fn compare(&self, other: &Instance) -> Ordering {
        self.predicate
            .compare(&other.predicate)
            .then_with(|| self.indices.cmp(&other.indices))
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate.name())?;
        for (i, index) in self.indices.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "x{}", index)?;
        }
        f.write_str(")")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Body,
    Head,
}

impl Side {
    pub fn flipped(self) -> Side {
        match self {
            Side::Body => Side::Head,
            Side::Head => Side::Body,
        }
    }
}

/// An instance placed on one side of a clause, tagged with its sequence
/// number in the instance universe.
///
/// Equality and hashing ignore the sequence number.
#[derive(Clone, Debug)]
pub struct PositionedInstance {
    instance: Instance,
    side: Side,
    index: usize,
}

impl PositionedInstance {
    pub fn new(instance: Instance, side: Side, index: usize) -> Self {
        Self {
            instance,
            side,
            index,
        }
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_in_body(&self) -> bool {
        self.side == Side::Body
    }

    /// The same atom and sequence number on `side`.
    pub fn with_side(&self, side: Side) -> PositionedInstance {
        PositionedInstance {
            instance: self.instance.clone(),
            side,
            index: self.index,
        }
    }

    /// Total atom order: predicate, side, variable pattern.
    pub fn compare(&self, other: &PositionedInstance) -> Ordering {
        self.instance
            .predicate
            .compare(&other.instance.predicate)
            .then_with(|| self.side.cmp(&other.side))
            .then_with(|| self.instance.indices.cmp(&other.instance.indices))
    }
}

impl PartialEq for PositionedInstance {
    fn eq(&self, other: &Self) -> bool {
        self.side == other.side && self.instance == other.instance
    }
}

impl Eq for PositionedInstance {}

impl Hash for PositionedInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instance.hash(state);
        self.side.hash(state);
    }
}

impl fmt::Display for PositionedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Side::Body => "body",
            Side::Head => "head",
        };
        write!(f, "{}@{}#{}", self.instance, side, self.index)
    }
}

/// Every instance of a set of predicates over variables `0..variables`.
///
/// Predicates are ordered by [`Predicate::compare`] and each predicate's
/// index vectors lexicographically, so for two atoms on the same side the
/// sequence number order agrees with [`PositionedInstance::compare`].
#[derive(Clone, Debug)]
pub struct InstanceList {
    instances: Vec<Instance>,
    positions: FxHashMap<Instance, usize>,
    variables: u32,
}

impl InstanceList {
    pub fn new(predicates: impl IntoIterator<Item = Arc<Predicate>>, variables: u32) -> Self {
        let mut predicates: Vec<Arc<Predicate>> = predicates.into_iter().collect();
        predicates.sort_by(|a, b| a.compare(b));
        predicates.dedup();

        let mut instances = Vec::new();
        for predicate in predicates {
            let arity = predicate.arity();
            if arity > 0 && variables == 0 {
                continue;
            }
            let mut pattern: Indices = SmallVec::from_elem(0, arity);
            loop {
                instances.push(Instance {
                    predicate: Arc::clone(&predicate),
                    indices: pattern.clone(),
                });
                if !advance(&mut pattern, variables) {
                    break;
                }
            }
        }

        let positions = instances
            .iter()
            .enumerate()
            .map(|(i, instance)| (instance.clone(), i))
            .collect();
        Self {
            instances,
            positions,
            variables,
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Upper bound (exclusive) on variable indices in this list.
    pub fn variables(&self) -> u32 {
        self.variables
    }

    pub fn get(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    pub fn index_of(&self, instance: &Instance) -> Option<usize> {
        self.positions.get(instance).copied()
    }

    pub fn positioned(&self, index: usize, side: Side) -> Option<PositionedInstance> {
        self.get(index)
            .map(|instance| PositionedInstance::new(instance.clone(), side, index))
    }

    /// Look up `instance` and place it on `side`.
    pub fn position(&self, instance: &Instance, side: Side) -> Option<PositionedInstance> {
        self.index_of(instance)
            .map(|index| PositionedInstance::new(instance.clone(), side, index))
    }

    /// All body candidates in sequence order, then all head candidates.
    pub fn candidates(&self) -> impl Iterator<Item = PositionedInstance> + '_ {
        [Side::Body, Side::Head].into_iter().flat_map(move |side| {
            self.instances
                .iter()
                .enumerate()
                .map(move |(i, instance)| PositionedInstance::new(instance.clone(), side, i))
        })
    }
}

/// Odometer step over `0..base` in lexicographic order. False once exhausted.
fn advance(pattern: &mut [u32], base: u32) -> bool {
    for digit in pattern.iter_mut().rev() {
        *digit += 1;
        if *digit < base {
            return true;
        }
        *digit = 0;
    }
    false
}

#[cfg(test)]
#[path = "tests/instance.rs"]
mod tests;
