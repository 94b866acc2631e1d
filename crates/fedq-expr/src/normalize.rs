//! Negation and disjunctive normal forms

use crate::comparison::Comparison;
use crate::error::{ExprResult, Resolution};
use fedq_types::{Entity, EntityId, TruthValue};
use std::fmt;

/// Push every negation down to the leaves.
///
/// The result contains no `Not` node; each negated subtree is replaced by
/// its dual.
pub fn to_nnf(query: &Comparison) -> Comparison {
    match query {
        Comparison::Not(term) => to_nnf(&term.negate()),
        Comparison::And(terms) => Comparison::And(terms.iter().map(to_nnf).collect()),
        Comparison::Or(terms) => Comparison::Or(terms.iter().map(to_nnf).collect()),
        leaf => leaf.clone(),
    }
}

/// Rewrite into a disjunction of conjunctive clauses. Applies [`to_nnf`]
/// first.
pub fn to_dnf(query: &Comparison) -> Dnf {
    let clauses = distribute(&to_nnf(query))
        .into_iter()
        .map(|terms| Clause { terms })
        .collect();
    Dnf { clauses }
}

fn distribute(query: &Comparison) -> Vec<Vec<Comparison>> {
    match query {
        Comparison::Or(terms) => terms.iter().flat_map(distribute).collect(),
        Comparison::And(terms) => terms.iter().fold(vec![Vec::new()], |acc, term| {
            let rhs = distribute(term);
            let mut product = Vec::with_capacity(acc.len() * rhs.len());
            for left in &acc {
                for right in &rhs {
                    let mut merged = left.clone();
                    merged.extend(right.iter().cloned());
                    product.push(merged);
                }
            }
            product
        }),
        leaf => vec![vec![leaf.clone()]],
    }
}

/// A conjunction of leaf comparisons
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clause {
    pub terms: Vec<Comparison>,
}

impl Clause {
    pub fn new(terms: Vec<Comparison>) -> Self {
        Self { terms }
    }

    pub fn terms(&self) -> &[Comparison] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// An empty clause is always true
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.terms.iter().flat_map(Comparison::field_names).collect()
    }

    pub fn resolve<Id: EntityId>(&self, entity: &Entity<Id>) -> ExprResult<Resolution<TruthValue>> {
        self.to_comparison().resolve(entity)
    }

    pub fn to_comparison(&self) -> Comparison {
        Comparison::And(self.terms.clone())
    }
}

impl From<Clause> for Comparison {
    fn from(clause: Clause) -> Self {
        Comparison::And(clause.terms)
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_comparison())
    }
}

/// A disjunction of [`Clause`]s
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dnf {
    pub clauses: Vec<Clause>,
}

impl Dnf {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// A DNF without clauses is always false
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn to_comparison(&self) -> Comparison {
        Comparison::Or(self.clauses.iter().map(Clause::to_comparison).collect())
    }
}

impl IntoIterator for Dnf {
    type Item = Clause;
    type IntoIter = std::vec::IntoIter<Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.into_iter()
    }
}

impl fmt::Display for Dnf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_comparison())
    }
}
