//! Resolver errors

use crate::source::SourceError;
use fedq_expr::{Comparison, ExprError};
use std::time::Duration;
use thiserror::Error;

/// Result type for query resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors that can end a `process_query` call
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Type confusion while evaluating the query
    #[error(transparent)]
    Expr(#[from] ExprError),

    /// A data source failed; the call is aborted without retry
    #[error("Data source '{source_name}' failed: {error}")]
    Source {
        source_name: String,
        #[source]
        error: SourceError,
    },

    /// No data source can ever supply the fields the query needs
    #[error("Query is unsolvable: no data source can supply the fields it needs")]
    Unsolvable,

    /// Progress stalled before every term could be decided
    #[error("Query is only partially solvable, unresolved: {}", join_terms(.remaining))]
    PartiallySolvable { remaining: Vec<Comparison> },

    #[error("Query resolution was cancelled")]
    Cancelled,

    #[error("Query resolution timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

impl ResolveError {
    pub fn source_failed(source_name: impl Into<String>, error: SourceError) -> Self {
        Self::Source {
            source_name: source_name.into(),
            error,
        }
    }

    pub fn partially_solvable(remaining: Vec<Comparison>) -> Self {
        Self::PartiallySolvable { remaining }
    }

    pub fn is_unsolvable(&self) -> bool {
        matches!(self, Self::Unsolvable)
    }

    /// Cancellation and deadline expiry
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Timeout { .. })
    }
}

fn join_terms(terms: &[Comparison]) -> String {
    terms
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
