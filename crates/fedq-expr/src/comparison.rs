//! Comparison expressions
//!
//! Leaf comparators compare value expressions; `And`, `Or` and `Not`
//! compose them into boolean trees. Every node has a logical dual used by
//! the negation normal form:
//!
//! | node               | negate()              |
//! |--------------------|-----------------------|
//! | `Equal(a, b)`      | `NotEqual(a, b)`      |
//! | `Less(a, b)`       | `GreaterEqual(a, b)`  |
//! | `In(a, xs)`        | `NotIn(a, xs)`        |
//! | `Exists(f)`        | `NotExists(f)`        |
//! | `And(ts)`          | `Or(negate(ts))`      |
//! | `Not(t)`           | `t`                   |
//!
//! `GreaterEqual(a, b)` is evaluated as `not(Less(a, b))`, so the pair keeps
//! one truth table between them.

use crate::error::{ExprResult, Resolution};
use crate::list_expr::ListExpr;
use crate::value_expr::ValueExpr;
use fedq_types::{Entity, EntityId, FieldName, TruthValue, Value};
use std::fmt;

/// A truth-valued expression over an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Equal(ValueExpr, ValueExpr),
    NotEqual(ValueExpr, ValueExpr),
    /// `a < b`
    Less(ValueExpr, ValueExpr),
    /// `a >= b`, evaluated as `not(a < b)`
    GreaterEqual(ValueExpr, ValueExpr),
    In(ValueExpr, ListExpr),
    NotIn(ValueExpr, ListExpr),
    Exists(FieldName),
    NotExists(FieldName),
    And(Vec<Comparison>),
    Or(Vec<Comparison>),
    Not(Box<Comparison>),
}

impl Comparison {
    pub fn equal(a: ValueExpr, b: ValueExpr) -> Self {
        Self::Equal(a, b)
    }

    pub fn not_equal(a: ValueExpr, b: ValueExpr) -> Self {
        Self::NotEqual(a, b)
    }

    pub fn less(a: ValueExpr, b: ValueExpr) -> Self {
        Self::Less(a, b)
    }

    pub fn greater_equal(a: ValueExpr, b: ValueExpr) -> Self {
        Self::GreaterEqual(a, b)
    }

    /// `a > b`, stored as `b < a`
    pub fn greater(a: ValueExpr, b: ValueExpr) -> Self {
        Self::Less(b, a)
    }

    /// `a <= b`, stored as `b >= a`
    pub fn less_equal(a: ValueExpr, b: ValueExpr) -> Self {
        Self::GreaterEqual(b, a)
    }

    pub fn in_list(a: ValueExpr, candidates: impl Into<ListExpr>) -> Self {
        Self::In(a, candidates.into())
    }

    pub fn not_in(a: ValueExpr, candidates: impl Into<ListExpr>) -> Self {
        Self::NotIn(a, candidates.into())
    }

    pub fn exists(field: impl Into<FieldName>) -> Self {
        Self::Exists(field.into())
    }

    pub fn not_exists(field: impl Into<FieldName>) -> Self {
        Self::NotExists(field.into())
    }

    pub fn and(terms: Vec<Comparison>) -> Self {
        Self::And(terms)
    }

    pub fn or(terms: Vec<Comparison>) -> Self {
        Self::Or(terms)
    }

    pub fn not(term: Comparison) -> Self {
        Self::Not(Box::new(term))
    }

    /// Whether this node is a connective rather than a comparator
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::And(_) | Self::Or(_) | Self::Not(_))
    }

    /// Evaluate against an entity
    pub fn resolve<Id: EntityId>(&self, entity: &Entity<Id>) -> ExprResult<Resolution<TruthValue>> {
        match self {
            Self::Equal(a, b) => Self::resolve_pair(a, b, entity, Value::equal),
            Self::NotEqual(a, b) => Ok(Self::resolve_pair(a, b, entity, Value::equal)?.map(TruthValue::not)),
            Self::Less(a, b) => Self::resolve_pair(a, b, entity, Value::less),
            Self::GreaterEqual(a, b) => Ok(Self::resolve_pair(a, b, entity, Value::less)?.map(TruthValue::not)),
            Self::In(target, candidates) => Self::resolve_in(target, candidates, entity),
            Self::NotIn(target, candidates) => {
                Ok(Self::resolve_in(target, candidates, entity)?.map(TruthValue::not))
            }
            Self::Exists(field) => Ok(Self::resolve_presence(field, entity)),
            Self::NotExists(field) => Ok(Self::resolve_presence(field, entity).map(TruthValue::not)),
            Self::And(terms) => Self::resolve_and(terms, entity),
            Self::Or(terms) => Self::resolve_or(terms, entity),
            Self::Not(term) => Ok(term.resolve(entity)?.map(TruthValue::not)),
        }
    }

    fn resolve_pair<Id: EntityId>(
        a: &ValueExpr,
        b: &ValueExpr,
        entity: &Entity<Id>,
        op: fn(&Value, &Value) -> fedq_types::ValueResult<TruthValue>,
    ) -> ExprResult<Resolution<TruthValue>> {
        let (Resolution::Resolved(va), Resolution::Resolved(vb)) = (a.resolve(entity)?, b.resolve(entity)?) else {
            return Ok(Resolution::Unresolvable);
        };
        Ok(Resolution::Resolved(op(&va, &vb)?))
    }

    fn resolve_presence<Id: EntityId>(field: &str, entity: &Entity<Id>) -> Resolution<TruthValue> {
        if entity.is_present(field) {
            Resolution::Resolved(entity.presence(field))
        } else {
            Resolution::Unresolvable
        }
    }

    // A single confirmed match decides the node even if other candidates are
    // still pending; deciding "no match" needs every candidate.
    fn resolve_in<Id: EntityId>(
        target: &ValueExpr,
        candidates: &ListExpr,
        entity: &Entity<Id>,
    ) -> ExprResult<Resolution<TruthValue>> {
        let Resolution::Resolved(needle) = target.resolve(entity)? else {
            return Ok(Resolution::Unresolvable);
        };

        let mut pending = false;
        let mut result = TruthValue::False;
        for candidate in candidates.candidates(entity)? {
            match candidate {
                Resolution::Unresolvable => pending = true,
                Resolution::Resolved(value) => {
                    let matched = value.equal(&needle)?;
                    if matched.is_true() {
                        return Ok(Resolution::Resolved(TruthValue::True));
                    }
                    result = result.or(matched);
                }
            }
        }

        if pending {
            Ok(Resolution::Unresolvable)
        } else {
            Ok(Resolution::Resolved(result))
        }
    }

    fn resolve_and<Id: EntityId>(terms: &[Comparison], entity: &Entity<Id>) -> ExprResult<Resolution<TruthValue>> {
        let mut pending = false;
        let mut result = TruthValue::True;
        for term in terms {
            match term.resolve(entity)? {
                Resolution::Unresolvable => pending = true,
                Resolution::Resolved(value) => {
                    result = result.and(value);
                    if result.is_false() {
                        return Ok(Resolution::Resolved(TruthValue::False));
                    }
                }
            }
        }

        if pending {
            Ok(Resolution::Unresolvable)
        } else {
            Ok(Resolution::Resolved(result))
        }
    }

    fn resolve_or<Id: EntityId>(terms: &[Comparison], entity: &Entity<Id>) -> ExprResult<Resolution<TruthValue>> {
        let mut pending = false;
        let mut result = TruthValue::False;
        for term in terms {
            match term.resolve(entity)? {
                Resolution::Unresolvable => pending = true,
                Resolution::Resolved(value) => {
                    result = result.or(value);
                    if result.is_true() {
                        return Ok(Resolution::Resolved(TruthValue::True));
                    }
                }
            }
        }

        if pending {
            Ok(Resolution::Unresolvable)
        } else {
            Ok(Resolution::Resolved(result))
        }
    }

    /// Whether `resolve` would decide this node for `entity`.
    ///
    /// A node whose evaluation fails with type confusion counts as
    /// resolvable: calling `resolve` surfaces the error.
    pub fn is_resolvable<Id: EntityId>(&self, entity: &Entity<Id>) -> bool {
        match self {
            Self::Equal(a, b) | Self::NotEqual(a, b) | Self::Less(a, b) | Self::GreaterEqual(a, b) => {
                a.is_resolvable(entity) && b.is_resolvable(entity)
            }
            Self::Exists(field) | Self::NotExists(field) => entity.is_present(field),
            Self::In(..) | Self::NotIn(..) | Self::And(_) | Self::Or(_) | Self::Not(_) => {
                !matches!(self.resolve(entity), Ok(Resolution::Unresolvable))
            }
        }
    }

    /// Fields this node depends on, in order of appearance
    pub fn field_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_field_names(&mut names);
        names
    }

    fn collect_field_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Equal(a, b) | Self::NotEqual(a, b) | Self::Less(a, b) | Self::GreaterEqual(a, b) => {
                a.collect_field_names(names);
                b.collect_field_names(names);
            }
            Self::In(target, candidates) | Self::NotIn(target, candidates) => {
                target.collect_field_names(names);
                candidates.collect_field_names(names);
            }
            Self::Exists(field) | Self::NotExists(field) => names.push(field),
            Self::And(terms) | Self::Or(terms) => {
                for term in terms {
                    term.collect_field_names(names);
                }
            }
            Self::Not(term) => term.collect_field_names(names),
        }
    }

    pub fn is_const(&self) -> bool {
        match self {
            Self::Equal(a, b) | Self::NotEqual(a, b) | Self::Less(a, b) | Self::GreaterEqual(a, b) => {
                a.is_const() && b.is_const()
            }
            Self::In(target, candidates) | Self::NotIn(target, candidates) => {
                target.is_const() && candidates.is_const()
            }
            Self::Exists(_) | Self::NotExists(_) => false,
            Self::And(terms) | Self::Or(terms) => terms.iter().all(Comparison::is_const),
            Self::Not(term) => term.is_const(),
        }
    }

    /// The logical dual of this node
    pub fn negate(&self) -> Comparison {
        match self {
            Self::Equal(a, b) => Self::NotEqual(a.clone(), b.clone()),
            Self::NotEqual(a, b) => Self::Equal(a.clone(), b.clone()),
            Self::Less(a, b) => Self::GreaterEqual(a.clone(), b.clone()),
            Self::GreaterEqual(a, b) => Self::Less(a.clone(), b.clone()),
            Self::In(target, candidates) => Self::NotIn(target.clone(), candidates.clone()),
            Self::NotIn(target, candidates) => Self::In(target.clone(), candidates.clone()),
            Self::Exists(field) => Self::NotExists(field.clone()),
            Self::NotExists(field) => Self::Exists(field.clone()),
            Self::And(terms) => Self::Or(terms.iter().map(Comparison::negate).collect()),
            Self::Or(terms) => Self::And(terms.iter().map(Comparison::negate).collect()),
            Self::Not(term) => term.as_ref().clone(),
        }
    }

    /// Whether the tree contains no `Not` node
    pub fn is_negation_free(&self) -> bool {
        match self {
            Self::Not(_) => false,
            Self::And(terms) | Self::Or(terms) => terms.iter().all(Comparison::is_negation_free),
            _ => true,
        }
    }

    /// Whether this node could ever evaluate to true when only the fields
    /// accepted by `available` can be produced.
    ///
    /// A leaf over a field nobody can produce stays unresolvable forever,
    /// so it can never be true.
    pub fn is_satisfiable_with(&self, available: &dyn Fn(&str) -> bool) -> bool {
        let all_available = |exprs: &[&ValueExpr]| {
            exprs
                .iter()
                .all(|expr| expr.field_names().into_iter().all(available))
        };

        match self {
            Self::Equal(a, b) | Self::NotEqual(a, b) | Self::Less(a, b) | Self::GreaterEqual(a, b) => {
                all_available(&[a, b])
            }
            Self::In(target, candidates) => all_available(&[target]) && candidates.any_available(available),
            Self::NotIn(target, candidates) => all_available(&[target]) && candidates.all_available(available),
            Self::Exists(field) | Self::NotExists(field) => available(field.as_str()),
            Self::And(terms) => terms.iter().all(|t| t.is_satisfiable_with(available)),
            Self::Or(terms) => terms.iter().any(|t| t.is_satisfiable_with(available)),
            Self::Not(term) => term.field_names().into_iter().all(available),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: impl IntoIterator<Item = impl fmt::Display>, sep: &str) -> fmt::Result {
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal(a, b) => write!(f, "{} = {}", a, b),
            Self::NotEqual(a, b) => write!(f, "{} ≠ {}", a, b),
            Self::Less(a, b) => write!(f, "{} < {}", a, b),
            Self::GreaterEqual(a, b) => write!(f, "{} ≥ {}", a, b),
            Self::In(target, candidates) | Self::NotIn(target, candidates) => {
                let op = if matches!(self, Self::In(..)) { "∈" } else { "∉" };
                write!(f, "{} {} {}", target, op, candidates)
            }
            Self::Exists(field) => write!(f, "∃ @{}", field),
            Self::NotExists(field) => write!(f, "∄ @{}", field),
            Self::And(terms) if terms.is_empty() => f.write_str("true"),
            Self::Or(terms) if terms.is_empty() => f.write_str("false"),
            Self::And(terms) => {
                f.write_str("(")?;
                write_joined(f, terms, " ∧ ")?;
                f.write_str(")")
            }
            Self::Or(terms) => {
                f.write_str("(")?;
                write_joined(f, terms, " ∨ ")?;
                f.write_str(")")
            }
            Self::Not(term) => write!(f, "¬({})", term),
        }
    }
}
