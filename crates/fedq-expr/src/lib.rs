//! fedq expression algebra
//!
//! Queries are trees of [`Comparison`] nodes whose leaves compare
//! [`ValueExpr`] operands, or test membership in a [`ListExpr`]. Trees are
//! immutable once built and can be shared across threads; evaluation takes
//! a borrowed entity.
//!
//! # Resolution
//!
//! Evaluating a node against an entity has three outcomes:
//!
//! - `Ok(Resolution::Resolved(v))`: enough fields are present to decide
//! - `Ok(Resolution::Unresolvable)`: some needed field is still absent
//! - `Err(ExprError)`: type confusion between operands
//!
//! `And`/`Or` tolerate unresolvable terms as long as the aggregate is
//! already decided (a false conjunct, a true disjunct).
//!
//! # Normal forms
//!
//! [`to_nnf`] pushes negation down to the leaves using each node's logical
//! dual, and [`to_dnf`] distributes conjunction over disjunction into a flat
//! list of [`Clause`]s. DNF is exponential in the nesting depth of
//! AND-over-OR; this is inherent to the form.

pub mod comparison;
pub mod error;
pub mod inspect;
pub mod list_expr;
pub mod normalize;
pub mod value_expr;

pub use comparison::Comparison;
pub use error::{ExprError, ExprResult, Resolution};
pub use inspect::FieldBounds;
pub use list_expr::ListExpr;
pub use normalize::{Clause, Dnf, to_dnf, to_nnf};
pub use value_expr::ValueExpr;
