//! Status clauses: nodes of the clausal search space.
//!
//! A status clause is an insertion-ordered list of positioned instances with
//! all body atoms before all head atoms. It only grows through
//! [`StatusClause::process_if_valid`], which enforces the legality rules, and
//! [`StatusClause::process_if_representative`], which additionally keeps one
//! member per class of clauses equal up to atom order and variable renaming.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{BuildHasherDefault, Hash, Hasher};

use hashbrown::HashMap;
use rustc_hash::FxHasher;
use smallvec::SmallVec;

use crate::environment::Environment;
use crate::formula::{Atom, Formula, Variable};
use crate::instance::{InstanceList, PositionedInstance, Side};
use crate::trace::trace;
use crate::vocabulary::permutations;

#[derive(Clone, Debug, Default)]
pub struct StatusClause {
    /// Number of variables introduced so far; the next free index.
    rank: u32,
    instances: im::Vector<PositionedInstance>,
    environment: Environment,
}

impl StatusClause {
    /// The empty clause.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rank(&self) -> u32 {
        self.rank
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> &im::Vector<PositionedInstance> {
        &self.instances
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn body(&self) -> impl Iterator<Item = &PositionedInstance> {
        self.instances.iter().filter(|i| i.is_in_body())
    }

    pub fn head(&self) -> impl Iterator<Item = &PositionedInstance> {
        self.instances.iter().filter(|i| !i.is_in_body())
    }

    /// True while no head atom has been added.
    pub fn in_body(&self) -> bool {
        self.instances.last().map_or(true, |last| last.is_in_body())
    }

    /// Sequence number of the last atom.
    pub fn index(&self) -> Option<usize> {
        self.instances.last().map(PositionedInstance::index)
    }

    pub fn contains(&self, instance: &PositionedInstance) -> bool {
        self.instances.iter().any(|i| i == instance)
    }

    fn side(&self) -> Side {
        if self.in_body() {
            Side::Body
        } else {
            Side::Head
        }
    }

    /// Whether `candidate` is a legal extension of this clause.
    pub fn can_process(&self, candidate: &PositionedInstance) -> bool {
        if candidate.side() == self.side() {
            if let Some(last) = self.index() {
                if candidate.index() <= last {
                    return false;
                }
            }
        }
        if !self.in_body() && candidate.is_in_body() {
            return false;
        }
        let instance = candidate.instance();
        if !self
            .environment
            .is_valid_instance(instance.predicate(), instance.indices())
        {
            return false;
        }
        if !self.in_body() && self.contains(&candidate.with_side(Side::Body)) {
            return false;
        }
        (self.rank == 0 || self.is_connected(candidate)) && self.introduces_in_order(candidate)
    }

    fn is_connected(&self, candidate: &PositionedInstance) -> bool {
        candidate
            .instance()
            .indices()
            .iter()
            .any(|&i| i < self.rank)
    }

    /// Body atoms may introduce the next free variable; head atoms none.
    fn introduces_in_order(&self, candidate: &PositionedInstance) -> bool {
        let mut next = self.rank;
        for &index in candidate.instance().indices() {
            if candidate.is_in_body() && index == next {
                next += 1;
            } else if index >= next {
                return false;
            }
        }
        true
    }

    /// This clause extended with `candidate`, if that is legal.
    pub fn process_if_valid(&self, candidate: &PositionedInstance) -> Option<StatusClause> {
        if !self.can_process(candidate) {
            return None;
        }
        let instance = candidate.instance();
        let rank = instance.max().map_or(self.rank, |max| self.rank.max(max + 1));
        let environment = self
            .environment
            .add_instance(instance.predicate(), instance.indices())
            .ok()?;
        let mut instances = self.instances.clone();
        instances.push_back(candidate.clone());
        Some(StatusClause {
            rank,
            instances,
            environment,
        })
    }

    /// This clause extended with `candidate`, if that is legal and the result
    /// is the canonical member of its class.
    ///
    /// Every other insertion point for `candidate` is tried: the alternate
    /// atom sequence is renamed by first occurrence, mapped back into `list`,
    /// sorted and replayed from the empty clause. A legal replay that is
    /// smaller than the actual clause at its first differing position means
    /// the actual clause is not canonical. Then every permutation of the
    /// clause's variables is tried the same way, replayed in the only order a
    /// legal clause can take (body before head, sequence order within a
    /// side). The kept representative is thus the least one.
    ///
    /// The permutation pass is factorial in the rank, which `list` bounds.
    pub fn process_if_representative(
        &self,
        list: &InstanceList,
        candidate: &PositionedInstance,
    ) -> Option<StatusClause> {
        let clause = self.process_if_valid(candidate)?;
        for position in 0..self.len() {
            if !self.is_representative_with(list, &clause, position, candidate) {
                return None;
            }
        }
        if !clause.is_least_renaming(list) {
            return None;
        }
        Some(clause)
    }

    /// No renaming of this clause's variables replays to a smaller legal clause.
    fn is_least_renaming(&self, list: &InstanceList) -> bool {
        for permutation in permutations(self.rank as usize).into_iter().skip(1) {
            let rename = |i: u32| permutation.get(i as usize).map_or(i, |&p| p as u32);
            let renamed: Option<Vec<PositionedInstance>> = self
                .instances
                .iter()
                .map(|atom| list.position(&atom.instance().renamed(rename), atom.side()))
                .collect();
            let Some(mut renamed) = renamed else {
                continue;
            };
            renamed.sort_by_key(|atom| (atom.side(), atom.index()));
            let Some(rebuilt) = StatusClause::build(&renamed) else {
                continue;
            };
            if precedes(&rebuilt, self) {
                trace!(clause = %self, renamed = %rebuilt, "smaller renaming");
                return false;
            }
        }
        true
    }

    fn is_representative_with(
        &self,
        list: &InstanceList,
        clause: &StatusClause,
        position: usize,
        candidate: &PositionedInstance,
    ) -> bool {
        let mut alternate: Vec<PositionedInstance> = Vec::with_capacity(self.len() + 1);
        alternate.extend(self.instances.iter().take(position).cloned());
        alternate.push(candidate.clone());
        alternate.extend(self.instances.iter().skip(position).cloned());

        let Some(mut alternate) = canonical_renaming(list, &alternate) else {
            return true;
        };
        alternate.sort_by(PositionedInstance::compare);
        let Some(rebuilt) = StatusClause::build(&alternate) else {
            return true;
        };
        let representative = !precedes(&rebuilt, clause);
        trace!(
            clause = %clause,
            alternate = %rebuilt,
            position,
            representative,
            "canonical comparison"
        );
        representative
    }

    /// Replay `instances` from the empty clause.
    pub fn build<'a>(
        instances: impl IntoIterator<Item = &'a PositionedInstance>,
    ) -> Option<StatusClause> {
        instances
            .into_iter()
            .try_fold(StatusClause::new(), |clause, instance| {
                clause.process_if_valid(instance)
            })
    }

    /// Every canonical one-atom extension over `list`, body candidates first.
    pub fn refinements(&self, list: &InstanceList) -> Vec<StatusClause> {
        list.candidates()
            .filter_map(|candidate| self.process_if_representative(list, &candidate))
            .collect()
    }

    /// The clause as a formula, each variable typed by its environment binding.
    pub fn to_formula(&self) -> Formula {
        let atom = |positioned: &PositionedInstance| {
            let instance = positioned.instance();
            let args: SmallVec<[Variable; 4]> = instance
                .indices()
                .iter()
                .zip(instance.predicate().types())
                .map(|(&index, declared)| {
                    let ty = self.environment.get(index).unwrap_or(declared);
                    Variable::new(index, ty.clone())
                })
                .collect();
            Atom::new(instance.predicate().clone(), args)
        };
        Formula::clause(self.body().map(atom).collect(), self.head().map(atom).collect())
    }
}

type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Rename variables by first occurrence across `atoms` and look the renamed
/// atoms up in `list`. `None` if some renamed atom is not in the list.
fn canonical_renaming(
    list: &InstanceList,
    atoms: &[PositionedInstance],
) -> Option<Vec<PositionedInstance>> {
    let mut mapping: FxHashMap<u32, u32> = FxHashMap::default();
    for atom in atoms {
        for &index in atom.instance().indices() {
            let next = mapping.len() as u32;
            mapping.entry(index).or_insert(next);
        }
    }
    atoms
        .iter()
        .map(|atom| {
            let renamed = atom
                .instance()
                .renamed(|i| mapping.get(&i).copied().unwrap_or(i));
            list.position(&renamed, atom.side())
        })
        .collect()
}

/// Whether `alternate` is smaller than `actual` at their first difference.
fn precedes(alternate: &StatusClause, actual: &StatusClause) -> bool {
    for (a, b) in alternate.instances.iter().zip(actual.instances.iter()) {
        match a.compare(b) {
            Ordering::Less => return true,
            Ordering::Greater => return false,
            Ordering::Equal => {}
        }
    }
    false
}

impl PartialEq for StatusClause {
    fn eq(&self, other: &Self) -> bool {
        self.instances == other.instances
    }
}

impl Eq for StatusClause {}

impl Hash for StatusClause {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instances.hash(state);
    }
}

impl fmt::Display for StatusClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |f: &mut fmt::Formatter<'_>, atoms: Vec<&PositionedInstance>| {
            f.write_str("[")?;
            for (i, atom) in atoms.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", atom.instance())?;
            }
            f.write_str("]")
        };
        list(f, self.body().collect())?;
        f.write_str(" => ")?;
        list(f, self.head().collect())
    }
}

#[cfg(test)]
#[path = "tests/clause.rs"]
mod tests;
