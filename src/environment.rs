//! Typing environment of a clause under construction.
//!
//! Maps each variable index to the most specific type it has been used at.
//! Environments are persistent: extending one yields a new value that shares
//! structure with the old one, which stays valid for the parent clause.

use std::fmt;

use smallvec::SmallVec;

use crate::vocabulary::{Predicate, Type};

/// Raised by [`Environment::add_instance`] when a variable would have to take
/// two unrelated types. Callers are expected to check
/// [`Environment::is_valid_instance`] first, so this signals a broken caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    BindingConflict {
        variable: u32,
        bound: Type,
        needed: Type,
    },
}

impl fmt::Display for EnvironmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentError::BindingConflict {
                variable,
                bound,
                needed,
            } => write!(
                f,
                "variable x{} is bound to {} and cannot be used as {}",
                variable, bound, needed
            ),
        }
    }
}

impl std::error::Error for EnvironmentError {}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Environment {
    bindings: im::HashMap<u32, Type>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: u32) -> Option<&Type> {
        self.bindings.get(&variable)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Whether `predicate` applied to `indices` is type compatible with the
    /// current bindings.
    pub fn is_valid_instance(&self, predicate: &Predicate, indices: &[u32]) -> bool {
        self.narrowings(predicate, indices).is_ok()
    }

    /// Bind the variables of `predicate(indices)`, keeping for each the more
    /// specific of the old and the required type.
    pub fn add_instance(
        &self,
        predicate: &Predicate,
        indices: &[u32],
    ) -> Result<Environment, EnvironmentError> {
        let narrowings = self.narrowings(predicate, indices)?;
        let mut bindings = self.bindings.clone();
        for (variable, ty) in narrowings {
            bindings.insert(variable, ty.clone());
        }
        Ok(Environment { bindings })
    }

    /// The bindings that change, in argument order. A variable repeated within
    /// the same atom sees the narrowing made by its earlier occurrence.
    fn narrowings<'a>(
        &'a self,
        predicate: &'a Predicate,
        indices: &[u32],
    ) -> Result<SmallVec<[(u32, &'a Type); 4]>, EnvironmentError> {
        let mut changes: SmallVec<[(u32, &'a Type); 4]> = SmallVec::new();
        for (&variable, needed) in indices.iter().zip(predicate.types()) {
            let bound = changes
                .iter()
                .rev()
                .find(|(v, _)| *v == variable)
                .map(|(_, ty)| *ty)
                .or_else(|| self.bindings.get(&variable));
            match bound {
                None => changes.push((variable, needed)),
                Some(bound) if bound.is_super_type_of(needed) => {
                    if bound != needed {
                        changes.push((variable, needed));
                    }
                }
                Some(bound) if needed.is_super_type_of(bound) => {}
                Some(bound) => {
                    return Err(EnvironmentError::BindingConflict {
                        variable,
                        bound: bound.clone(),
                        needed: needed.clone(),
                    })
                }
            }
        }
        Ok(changes)
    }
}

#[cfg(test)]
#[path = "tests/environment.rs"]
mod tests;
