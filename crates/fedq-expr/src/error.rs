//! Expression errors and the resolution outcome

use fedq_types::ValueError;
use std::fmt;
use thiserror::Error;

/// Result type for expression evaluation
pub type ExprResult<T> = Result<T, ExprError>;

/// Errors that can occur while evaluating an expression
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// Operand type confusion
    #[error(transparent)]
    Value(#[from] ValueError),

    /// A value was demanded from an expression that cannot be resolved yet
    #[error("Tried to resolve an unresolvable expression: {expression}")]
    Unresolvable { expression: String },
}

impl ExprError {
    pub fn unresolvable(expression: &impl fmt::Display) -> Self {
        Self::Unresolvable {
            expression: expression.to_string(),
        }
    }
}

/// Outcome of evaluating an expression against a partial entity
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// Enough information was present to decide
    Resolved(T),
    /// Some field the expression depends on is still absent
    Unresolvable,
}

impl<T> Resolution<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn resolved(self) -> Option<T> {
        match self {
            Self::Resolved(value) => Some(value),
            Self::Unresolvable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Resolved(value) => Resolution::Resolved(f(value)),
            Self::Unresolvable => Resolution::Unresolvable,
        }
    }

    /// Demand a value, turning `Unresolvable` into an error naming `expr`
    pub fn require(self, expr: &impl fmt::Display) -> ExprResult<T> {
        match self {
            Self::Resolved(value) => Ok(value),
            Self::Unresolvable => Err(ExprError::unresolvable(expr)),
        }
    }
}
