//! Types, predicates and the logic base that validity checks run against.
//!
//! Everything here is created once when a problem is loaded and then only read.
//! Types form a forest through their parent links; `is_super_type_of` walks the
//! chain, which is all the environment ever needs from the type graph.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::formula::{Atom, Formula, Variable};
use crate::structure::{Example, ExampleError, Structure};

#[derive(Debug, PartialEq, Eq, Hash)]
struct TypeNode {
    name: String,
    parent: Option<Type>,
    builtin: bool,
}

/// A type in the vocabulary. Clones share one node.
#[derive(Clone, Debug, Eq, Hash)]
pub struct Type(Arc<TypeNode>);

impl Type {
    /// Create a root type.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(TypeNode {
            name: name.into(),
            parent: None,
            builtin: false,
        }))
    }

    /// Create a subtype of `parent`.
    pub fn with_parent(name: impl Into<String>, parent: &Type) -> Self {
        Self(Arc::new(TypeNode {
            name: name.into(),
            parent: Some(parent.clone()),
            builtin: false,
        }))
    }

    /// Create a type the oracle already knows (e.g. `int`).
    pub fn builtin(name: impl Into<String>) -> Self {
        Self(Arc::new(TypeNode {
            name: name.into(),
            parent: None,
            builtin: true,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parent(&self) -> Option<&Type> {
        self.0.parent.as_ref()
    }

    pub fn is_builtin(&self) -> bool {
        self.0.builtin
    }

    /// True if `other` is this type or one of its descendants.
    pub fn is_super_type_of(&self, other: &Type) -> bool {
        let mut current = Some(other);
        while let Some(ty) = current {
            if ty == self {
                return true;
            }
            current = ty.parent();
        }
        false
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A predicate symbol with typed parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Predicate {
    name: String,
    types: SmallVec<[Type; 4]>,
}

impl Predicate {
    pub fn new(name: impl Into<String>, types: impl IntoIterator<Item = Type>) -> Self {
        Self {
            name: name.into(),
            types: types.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn arity(&self) -> usize {
        self.types.len()
    }

    /// Fixed total order on predicates: name, then arity, then parameter type names.
    pub fn compare(&self, other: &Predicate) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.arity().cmp(&other.arity()))
            .then_with(|| {
                self.types
                    .iter()
                    .map(Type::name)
                    .cmp(other.types.iter().map(Type::name))
            })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, ty) in self.types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", ty)?;
        }
        f.write_str(")")
    }
}

/// A predicate the search may put into clauses.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PredicateDefinition {
    pub predicate: Arc<Predicate>,
    /// Argument order does not matter for this predicate.
    pub symmetric: bool,
}

impl PredicateDefinition {
    pub fn new(predicate: Arc<Predicate>) -> Self {
        Self {
            predicate,
            symmetric: false,
        }
    }

    pub fn symmetric(predicate: Arc<Predicate>) -> Self {
        Self {
            predicate,
            symmetric: true,
        }
    }
}

/// Types and predicates known to the oracle.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    types: Vec<Type>,
    predicates: Vec<Arc<Predicate>>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type and hand back a clone of it.
    pub fn add_type(&mut self, ty: Type) -> Type {
        self.types.push(ty.clone());
        ty
    }

    /// Register a predicate and hand back the shared handle.
    pub fn add_predicate(&mut self, predicate: Predicate) -> Arc<Predicate> {
        let predicate = Arc::new(predicate);
        self.predicates.push(Arc::clone(&predicate));
        predicate
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn predicates(&self) -> &[Arc<Predicate>] {
        &self.predicates
    }

    pub fn type_named(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|ty| ty.name() == name)
    }

    pub fn predicate_named(&self, name: &str) -> Option<&Arc<Predicate>> {
        self.predicates.iter().find(|p| p.name() == name)
    }

    pub fn contains_predicate(&self, predicate: &Predicate) -> bool {
        self.predicates.iter().any(|p| **p == *predicate)
    }
}

/// Vocabulary, examples and search predicates of one learning problem.
///
/// The background structures are derived from the examples once, at
/// construction, and shared by every oracle call made on behalf of this base.
#[derive(Clone, Debug)]
pub struct LogicBase {
    vocabulary: Arc<Vocabulary>,
    examples: Vec<Example>,
    search_predicates: Vec<PredicateDefinition>,
    structures: Arc<[Structure]>,
}

impl LogicBase {
    pub fn new(
        vocabulary: Arc<Vocabulary>,
        examples: Vec<Example>,
        search_predicates: Vec<PredicateDefinition>,
    ) -> Result<Self, ExampleError> {
        let structures = examples
            .iter()
            .map(|example| example.structure(&vocabulary))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            vocabulary,
            examples,
            search_predicates,
            structures: structures.into(),
        })
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn search_predicates(&self) -> &[PredicateDefinition] {
        &self.search_predicates
    }

    /// One background structure per example, in example order.
    pub fn structures(&self) -> &Arc<[Structure]> {
        &self.structures
    }

    /// Horn formulas stating that each symmetric search predicate is
    /// invariant under every non-identity permutation of its arguments.
    pub fn symmetry_formulas(&self) -> Vec<Formula> {
        let mut formulas = Vec::new();
        for definition in self.search_predicates.iter().filter(|d| d.symmetric) {
            let predicate = &definition.predicate;
            let variables: SmallVec<[Variable; 4]> = predicate
                .types()
                .iter()
                .enumerate()
                .map(|(i, ty)| Variable::new(i as u32, ty.clone()))
                .collect();
            let body = Atom::new(Arc::clone(predicate), variables.clone());
            for permutation in permutations(predicate.arity()).into_iter().skip(1) {
                let args = permutation.iter().map(|&i| variables[i].clone());
                let head = Atom::new(Arc::clone(predicate), args.collect());
                formulas.push(Formula::horn(head, body.clone()));
            }
        }
        formulas
    }

    /// One logic base per example, sharing vocabulary and search predicates.
    pub fn split(&self) -> Vec<LogicBase> {
        self.examples
            .iter()
            .zip(self.structures.iter())
            .map(|(example, structure)| LogicBase {
                vocabulary: Arc::clone(&self.vocabulary),
                examples: vec![example.clone()],
                search_predicates: self.search_predicates.clone(),
                structures: Arc::from(vec![structure.clone()]),
            })
            .collect()
    }
}

/// All permutations of `0..n` in lexicographic order, identity first.
pub(crate) fn permutations(n: usize) -> Vec<Vec<usize>> {
    let mut current: Vec<usize> = (0..n).collect();
    let mut result = vec![current.clone()];
    loop {
        let Some(pivot) = (1..n).rev().find(|&i| current[i - 1] < current[i]) else {
            return result;
        };
        let pivot = pivot - 1;
        let mut swap = n - 1;
        while current[swap] <= current[pivot] {
            swap -= 1;
        }
        current.swap(pivot, swap);
        current[pivot + 1..].reverse();
        result.push(current.clone());
    }
}

#[cfg(test)]
#[path = "tests/vocabulary.rs"]
mod tests;
