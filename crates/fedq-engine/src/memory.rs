//! In-memory data source

use crate::source::{DataSource, Retrieval, SourceError};
use async_trait::async_trait;
use fedq_expr::{Comparison, FieldBounds};
use fedq_types::{Entities, Entity, EntityId, FieldName, Value};
use indexmap::IndexMap;
use parking_lot::Mutex;

/// How a [`MemorySource`] treats identities it was not asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// Introduces its own records as new identities, restricted to those
    /// that can satisfy the constant bounds of the query
    Seed,
    /// Only decorates identities already in the working set
    #[default]
    Decorate,
}

/// A data source backed by a fixed record table
#[derive(Debug)]
pub struct MemorySource<Id> {
    name: String,
    fields: Vec<FieldName>,
    mode: SourceMode,
    records: IndexMap<Id, IndexMap<FieldName, Value>>,
    queries: Mutex<Vec<Comparison>>,
}

impl<Id: EntityId> MemorySource<Id> {
    pub fn new(name: impl Into<String>, fields: Vec<FieldName>, mode: SourceMode) -> Self {
        Self {
            name: name.into(),
            fields,
            mode,
            records: IndexMap::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn seeding<F: Into<FieldName>>(name: impl Into<String>, fields: impl IntoIterator<Item = F>) -> Self {
        Self::new(name, fields.into_iter().map(Into::into).collect(), SourceMode::Seed)
    }

    pub fn decorating<F: Into<FieldName>>(name: impl Into<String>, fields: impl IntoIterator<Item = F>) -> Self {
        Self::new(name, fields.into_iter().map(Into::into).collect(), SourceMode::Decorate)
    }

    /// Add one field of a record
    pub fn insert(&mut self, id: Id, field: impl Into<FieldName>, value: impl Into<Value>) {
        self.records.entry(id).or_default().insert(field.into(), value.into());
    }

    pub fn with_record<F, V>(mut self, id: Id, fields: impl IntoIterator<Item = (F, V)>) -> Self
    where
        F: Into<FieldName>,
        V: Into<Value>,
    {
        let record = self.records.entry(id).or_default();
        for (field, value) in fields {
            record.insert(field.into(), value.into());
        }
        self
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Queries received so far, oldest first
    pub fn queries(&self) -> Vec<Comparison> {
        self.queries.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().len()
    }

    fn entity_for(&self, id: &Id, record: &IndexMap<FieldName, Value>) -> Entity<Id> {
        let mut entity = Entity::new(id.clone());
        for (field, value) in record {
            if self.declares(field) {
                entity.add_field(field.clone(), value.clone());
            }
        }
        entity
    }

    fn seed_bounds(&self, query: &Comparison) -> Vec<(&str, FieldBounds)> {
        self.fields
            .iter()
            .filter_map(|field| {
                // Type confusion is reported by the resolver's own evaluation.
                let bounds = query.field_bounds(field).unwrap_or_default();
                (!bounds.is_unbounded()).then_some((field.as_str(), bounds))
            })
            .collect()
    }
}

// Records whose value cannot be compared with a bound are admitted, so the
// resolver's evaluation reports the type confusion.
fn admits(record: &IndexMap<FieldName, Value>, bounds: &[(&str, FieldBounds)]) -> bool {
    bounds.iter().all(|(field, bounds)| match record.get(*field) {
        Some(Value::Primitive(value)) => !bounds.is_comparable(value) || bounds.contains(value),
        Some(Value::List(_)) => true,
        Some(Value::Missing) | None => false,
    })
}

#[async_trait]
impl<Id: EntityId> DataSource<Id> for MemorySource<Id> {
    fn name(&self) -> &str {
        &self.name
    }

    fn retrievable_fields(&self) -> &[FieldName] {
        &self.fields
    }

    async fn retrieve(&self, query: &Comparison, entities: &Entities<Id>) -> Result<Retrieval<Id>, SourceError> {
        self.queries.lock().push(query.clone());

        let mut out = Entities::new();
        match self.mode {
            SourceMode::Decorate => {
                if entities.is_empty() {
                    return Ok(Retrieval::not_applied());
                }
                for id in entities.keys() {
                    if let Some(record) = self.records.get(id) {
                        out.insert(id.clone(), self.entity_for(id, record));
                    }
                }
            }
            SourceMode::Seed => {
                let bounds = self.seed_bounds(query);
                for (id, record) in &self.records {
                    if entities.contains_key(id) || admits(record, &bounds) {
                        out.insert(id.clone(), self.entity_for(id, record));
                    }
                }
            }
        }
        Ok(Retrieval::applied(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedq_expr::ValueExpr;

    fn orders() -> MemorySource<u32> {
        MemorySource::seeding("orders", ["amount", "status"])
            .with_record(1, [("amount", Value::int(10)), ("status", Value::string("open"))])
            .with_record(2, [("amount", Value::int(3))])
            .with_record(3, [("amount", Value::Missing)])
    }

    #[tokio::test]
    async fn test_seed_returns_all_records_without_bounds() {
        let source = orders();
        let retrieval = source
            .retrieve(&Comparison::exists("amount"), &Entities::new())
            .await
            .unwrap();
        assert!(retrieval.applied);
        assert_eq!(retrieval.entities.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_seed_respects_constant_bounds() {
        let source = orders();
        let query = Comparison::less(ValueExpr::field("amount"), ValueExpr::constant(Value::int(5)));
        let retrieval = source.retrieve(&query, &Entities::new()).await.unwrap();
        assert_eq!(retrieval.entities.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn test_seed_admits_values_of_another_kind() {
        let source = orders().with_record(4, [("amount", Value::string("ten"))]);
        let query = Comparison::less(ValueExpr::field("amount"), ValueExpr::constant(Value::int(5)));
        let retrieval = source.retrieve(&query, &Entities::new()).await.unwrap();
        assert_eq!(retrieval.entities.keys().copied().collect::<Vec<_>>(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_seed_always_serves_known_identities() {
        let source = orders();
        let query = Comparison::less(ValueExpr::field("amount"), ValueExpr::constant(Value::int(5)));
        let mut known = Entities::new();
        known.insert(1, Entity::new(1));
        let retrieval = source.retrieve(&query, &known).await.unwrap();
        assert_eq!(retrieval.entities.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_decorate_needs_known_identities() {
        let source = MemorySource::decorating("drivers", ["driver"])
            .with_record(1u32, [("driver", Value::string("ana"))])
            .with_record(9u32, [("driver", Value::string("bo"))]);

        let empty = source.retrieve(&Comparison::exists("driver"), &Entities::new()).await.unwrap();
        assert!(!empty.applied);

        let mut known = Entities::new();
        known.insert(1, Entity::new(1));
        known.insert(2, Entity::new(2));
        let retrieval = source.retrieve(&Comparison::exists("driver"), &known).await.unwrap();
        assert!(retrieval.applied);
        assert_eq!(retrieval.entities.len(), 1);
        assert_eq!(retrieval.entities[&1].get("driver"), Some(&Value::string("ana")));
    }
}
