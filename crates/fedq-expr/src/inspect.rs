//! Read-only introspection over comparison trees
//!
//! Data sources use these helpers to look inside the clause they are asked
//! to serve, e.g. to push a range predicate down into their own lookup.

use crate::comparison::Comparison;
use crate::error::ExprResult;
use crate::list_expr::ListExpr;
use crate::value_expr::ValueExpr;
use fedq_types::Scalar;
use std::cmp::Ordering;
use std::ops::Bound;

impl Comparison {
    /// Visit every node in pre-order
    pub fn walk<'a>(&'a self, visitor: &mut impl FnMut(&'a Comparison)) {
        visitor(self);
        match self {
            Self::And(terms) | Self::Or(terms) => {
                for term in terms {
                    term.walk(visitor);
                }
            }
            Self::Not(term) => term.walk(visitor),
            _ => {}
        }
    }

    /// Every comparator node, in order of appearance
    pub fn leaves(&self) -> Vec<&Comparison> {
        let mut leaves = Vec::new();
        self.walk(&mut |node| {
            if !node.is_compound() {
                leaves.push(node);
            }
        });
        leaves
    }

    /// Terms that must all hold, flattening nested `And`s.
    ///
    /// Any other node is its own single conjunct.
    pub fn conjuncts(&self) -> Vec<&Comparison> {
        match self {
            Self::And(terms) => terms.iter().flat_map(Comparison::conjuncts).collect(),
            _ => vec![self],
        }
    }

    /// Constant bounds this node places on `field`.
    ///
    /// Only top-level conjuncts comparing the bare field against a constant
    /// contribute; anything else leaves the field unconstrained.
    pub fn field_bounds(&self, field: &str) -> ExprResult<FieldBounds> {
        let mut bounds = FieldBounds::default();
        for term in self.conjuncts() {
            match term {
                Self::Equal(a, b) => {
                    if let Some(value) = constant_against(field, a, b)? {
                        bounds.restrict_to(vec![value]);
                    }
                }
                // A list field leaves the target unbounded.
                Self::In(target, ListExpr::Items(candidates)) if target.is_field(field) => {
                    let mut values = Vec::with_capacity(candidates.len());
                    let mut bounded = true;
                    for candidate in candidates {
                        match candidate.const_value()? {
                            // Missing never matches.
                            Some(value) => values.extend(value.raw().cloned()),
                            None => {
                                bounded = false;
                                break;
                            }
                        }
                    }
                    if bounded {
                        bounds.restrict_to(values);
                    }
                }
                Self::Less(a, b) => {
                    if let Some(value) = constant_for(b)?.filter(|_| a.is_field(field)) {
                        bounds.tighten_upper(Bound::Excluded(value));
                    } else if let Some(value) = constant_for(a)?.filter(|_| b.is_field(field)) {
                        bounds.tighten_lower(Bound::Excluded(value));
                    }
                }
                Self::GreaterEqual(a, b) => {
                    if let Some(value) = constant_for(b)?.filter(|_| a.is_field(field)) {
                        bounds.tighten_lower(Bound::Included(value));
                    } else if let Some(value) = constant_for(a)?.filter(|_| b.is_field(field)) {
                        bounds.tighten_upper(Bound::Included(value));
                    }
                }
                _ => {}
            }
        }
        Ok(bounds)
    }
}

fn constant_for(expr: &ValueExpr) -> ExprResult<Option<Scalar>> {
    Ok(expr.const_value()?.and_then(|value| value.raw().cloned()))
}

fn constant_against(field: &str, a: &ValueExpr, b: &ValueExpr) -> ExprResult<Option<Scalar>> {
    if a.is_field(field) {
        constant_for(b)
    } else if b.is_field(field) {
        constant_for(a)
    } else {
        Ok(None)
    }
}

/// The set of values a field may take, as implied by a clause
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBounds {
    pub lower: Bound<Scalar>,
    pub upper: Bound<Scalar>,
    /// `Some` when the field is pinned to an explicit set of values
    pub equals: Option<Vec<Scalar>>,
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
            equals: None,
        }
    }
}

impl FieldBounds {
    pub fn is_unbounded(&self) -> bool {
        matches!(
            (&self.lower, &self.upper, &self.equals),
            (Bound::Unbounded, Bound::Unbounded, None)
        )
    }

    /// Whether `value` satisfies every bound. Values of a different kind
    /// than a bound never do.
    pub fn contains(&self, value: &Scalar) -> bool {
        if let Some(allowed) = &self.equals {
            if !allowed.contains(value) {
                return false;
            }
        }

        let above_lower = match &self.lower {
            Bound::Unbounded => true,
            Bound::Included(low) => matches!(value.compare(low), Ok(Some(Ordering::Greater | Ordering::Equal))),
            Bound::Excluded(low) => matches!(value.compare(low), Ok(Some(Ordering::Greater))),
        };
        let below_upper = match &self.upper {
            Bound::Unbounded => true,
            Bound::Included(high) => matches!(value.compare(high), Ok(Some(Ordering::Less | Ordering::Equal))),
            Bound::Excluded(high) => matches!(value.compare(high), Ok(Some(Ordering::Less))),
        };
        above_lower && below_upper
    }

    /// Whether `value` can be checked against every bound without type
    /// confusion
    pub fn is_comparable(&self, value: &Scalar) -> bool {
        let same_kind = self
            .equals
            .iter()
            .flatten()
            .all(|allowed| allowed.kind() == value.kind());
        let ordered = [&self.lower, &self.upper].into_iter().all(|bound| match bound {
            Bound::Unbounded => true,
            Bound::Included(limit) | Bound::Excluded(limit) => value.compare(limit).is_ok(),
        });
        same_kind && ordered
    }

    fn restrict_to(&mut self, values: Vec<Scalar>) {
        self.equals = Some(match self.equals.take() {
            Some(current) => current.into_iter().filter(|v| values.contains(v)).collect(),
            None => values,
        });
    }

    fn tighten_lower(&mut self, bound: Bound<Scalar>) {
        if tighter(&bound, &self.lower, Ordering::Greater) {
            self.lower = bound;
        }
    }

    fn tighten_upper(&mut self, bound: Bound<Scalar>) {
        if tighter(&bound, &self.upper, Ordering::Less) {
            self.upper = bound;
        }
    }
}

// Whether `candidate` is strictly more restrictive than `current`, where
// `direction` is the ordering of a more restrictive bound value.
fn tighter(candidate: &Bound<Scalar>, current: &Bound<Scalar>, direction: Ordering) -> bool {
    let (new, old) = match (candidate, current) {
        (Bound::Unbounded, _) => return false,
        (_, Bound::Unbounded) => return true,
        (Bound::Included(new) | Bound::Excluded(new), Bound::Included(old) | Bound::Excluded(old)) => (new, old),
    };
    match new.compare(old) {
        Ok(Some(Ordering::Equal)) => {
            matches!((candidate, current), (Bound::Excluded(_), Bound::Included(_)))
        }
        Ok(Some(ordering)) => ordering == direction,
        _ => false,
    }
}
