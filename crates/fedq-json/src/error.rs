//! Errors for the JSON collaborators

use thiserror::Error;

/// Result type for parsing queries, templates and fixtures
pub type DslResult<T> = Result<T, DslError>;

/// Errors raised while reading JSON documents
#[derive(Debug, Error)]
pub enum DslError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown field '{name}'")]
    UnknownField { name: String },

    #[error("Invalid field reference '{reference}'")]
    InvalidField { reference: String },

    #[error("Invalid {kind} constant: {value}")]
    InvalidConst { kind: String, value: String },

    #[error("Range needs at least one of 'from' or 'to'")]
    EmptyRange,

    #[error("'{node}' takes exactly two operands, got {count}")]
    Arity { node: &'static str, count: usize },

    #[error("Source '{source_name}' has a record with undeclared field '{field}'")]
    UndeclaredField { source_name: String, field: String },

    #[error("Template label '{label}' maps to an empty field name")]
    EmptyTemplateField { label: String },
}

impl DslError {
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField { name: name.into() }
    }

    pub fn invalid_field(reference: impl Into<String>) -> Self {
        Self::InvalidField {
            reference: reference.into(),
        }
    }

    pub fn invalid_const(kind: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidConst {
            kind: kind.into(),
            value: value.to_string(),
        }
    }
}
