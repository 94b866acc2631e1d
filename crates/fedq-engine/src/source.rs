//! Data source trait consumed by the resolver

use async_trait::async_trait;
use fedq_expr::Comparison;
use fedq_types::{Entities, EntityId, FieldName};
use std::sync::Arc;

/// A provider of some fields for some entities.
///
/// Sources are asked repeatedly while a clause is being resolved. Each call
/// receives the still-undecided part of the clause and a snapshot of the
/// entities known so far; it may decorate known entities and introduce new
/// identities.
#[async_trait]
pub trait DataSource<Id: EntityId>: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Every field this source can ever produce
    fn retrievable_fields(&self) -> &[FieldName];

    /// Retrieve whatever fields this source can supply.
    ///
    /// Fields not returned for an entity in the snapshot are recorded as
    /// missing once the source reports `applied`.
    async fn retrieve(
        &self,
        query: &Comparison,
        entities: &Entities<Id>,
    ) -> Result<Retrieval<Id>, SourceError>;

    fn declares(&self, field: &str) -> bool {
        self.retrievable_fields().iter().any(|f| f == field)
    }
}

/// Shared handle to a data source
pub type SourceRef<Id> = Arc<dyn DataSource<Id>>;

/// Outcome of one `retrieve` call
#[derive(Debug, Clone)]
pub struct Retrieval<Id> {
    /// Entities with the fields this source supplied
    pub entities: Entities<Id>,
    /// False when the source had nothing to contribute this round
    pub applied: bool,
}

impl<Id: EntityId> Retrieval<Id> {
    pub fn applied(entities: Entities<Id>) -> Self {
        Self {
            entities,
            applied: true,
        }
    }

    pub fn not_applied() -> Self {
        Self {
            entities: Entities::new(),
            applied: false,
        }
    }
}

/// Data source error
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Retrieve failed: {0}")]
    RetrieveFailed(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SourceError {
    pub fn retrieve_failed(message: impl Into<String>) -> Self {
        Self::RetrieveFailed(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
