//! Typed clause formulas, the unit of work handed to the oracle.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::vocabulary::{Predicate, Type};

/// A universally quantified variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variable {
    pub index: u32,
    pub ty: Type,
}

impl Variable {
    pub fn new(index: u32, ty: Type) -> Self {
        Self { index, ty }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.index)
    }
}

/// A predicate applied to variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Atom {
    predicate: Arc<Predicate>,
    args: SmallVec<[Variable; 4]>,
}

impl Atom {
    pub fn new(predicate: Arc<Predicate>, args: SmallVec<[Variable; 4]>) -> Self {
        debug_assert_eq!(predicate.arity(), args.len());
        Self { predicate, args }
    }

    pub fn predicate(&self) -> &Arc<Predicate> {
        &self.predicate
    }

    pub fn args(&self) -> &[Variable] {
        &self.args
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate.name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

/// `forall vars: body_1 & ... & body_n => head_1 | ... | head_m`.
///
/// Equality and hashing are structural, so two clauses built independently
/// from the same atoms share one cache entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Formula {
    body: Vec<Atom>,
    head: Vec<Atom>,
}

impl Formula {
    pub fn clause(body: Vec<Atom>, head: Vec<Atom>) -> Self {
        Self { body, head }
    }

    /// `body => head`.
    pub fn horn(head: Atom, body: Atom) -> Self {
        Self {
            body: vec![body],
            head: vec![head],
        }
    }

    pub fn body(&self) -> &[Atom] {
        &self.body
    }

    pub fn head(&self) -> &[Atom] {
        &self.head
    }

    /// Distinct variables in order of first occurrence.
    pub fn variables(&self) -> Vec<Variable> {
        let mut seen: Vec<Variable> = Vec::new();
        for atom in self.body.iter().chain(self.head.iter()) {
            for arg in atom.args() {
                if !seen.iter().any(|v| v.index == arg.index) {
                    seen.push(arg.clone());
                }
            }
        }
        seen
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, atoms: &[Atom], sep: &str, empty: &str) -> fmt::Result {
    if atoms.is_empty() {
        return f.write_str(empty);
    }
    for (i, atom) in atoms.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", atom)?;
    }
    Ok(())
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.body, " & ", "true")?;
        f.write_str(" => ")?;
        write_joined(f, &self.head, " | ", "false")
    }
}

#[cfg(test)]
#[path = "tests/formula.rs"]
mod tests;
