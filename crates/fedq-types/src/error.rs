//! Value errors

use crate::value::ScalarKind;
use thiserror::Error;

/// Result type for value operations
pub type ValueResult<T> = Result<T, ValueError>;

/// Errors raised when operands are confused about their types.
///
/// Missing data is never an error; see [`crate::Value::Missing`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Operands of different scalar kinds
    #[error("Type mismatch in {operation}: {left} vs {right}")]
    TypeMismatch {
        operation: &'static str,
        left: ScalarKind,
        right: ScalarKind,
    },

    /// Operation not defined for this scalar kind
    #[error("Operation {operation} is not defined for {kind}")]
    Unsupported {
        operation: &'static str,
        kind: ScalarKind,
    },

    /// Ordering requested on an unordered kind
    #[error("Values of kind {kind} have no order")]
    Unordered { kind: ScalarKind },

    /// A list used where a scalar is required
    #[error("Operation {operation} is not defined for lists")]
    ListOperand { operation: &'static str },

    /// A scalar field used where a list is required
    #[error("Field {field} holds a {kind}, not a list")]
    NotAList { field: String, kind: ScalarKind },

    /// Integer arithmetic overflow
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: &'static str },

    /// Field lookup on a field the entity has never seen
    #[error("Field not found: {field}")]
    FieldNotFound { field: String },
}

impl ValueError {
    /// Create a type mismatch error
    pub fn type_mismatch(operation: &'static str, left: ScalarKind, right: ScalarKind) -> Self {
        Self::TypeMismatch {
            operation,
            left,
            right,
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: &'static str, kind: ScalarKind) -> Self {
        Self::Unsupported { operation, kind }
    }

    /// Create a field not found error
    pub fn field_not_found(field: impl Into<String>) -> Self {
        Self::FieldNotFound {
            field: field.into(),
        }
    }

    /// Whether this error reports operands of incompatible kinds
    pub fn is_type_confusion(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. }
                | Self::Unsupported { .. }
                | Self::Unordered { .. }
                | Self::ListOperand { .. }
                | Self::NotAList { .. }
        )
    }
}
