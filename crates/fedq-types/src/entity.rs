//! Partial entity records
//!
//! An [`Entity`] is an identity plus whatever fields providers have reported
//! so far. Each field is in one of three observable states:
//!
//! - absent: no provider has been asked about it yet
//! - present and missing: a provider confirmed it does not apply
//! - present with a value
//!
//! The resolver relies on this distinction to tell "no progress possible"
//! apart from "field confirmed empty".

use crate::error::{ValueError, ValueResult};
use crate::truth::TruthValue;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Name of an entity field, e.g. `order.status`
pub type FieldName = String;

/// Bound for entity identities: plain equality and hashing
pub trait EntityId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> EntityId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Ordered map of entities keyed by identity
pub type Entities<Id> = IndexMap<Id, Entity<Id>>;

/// Whether a field slot has been filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Absent,
    Present,
}

/// An identity plus a partial record of named field values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity<Id> {
    id: Id,
    fields: IndexMap<FieldName, Value>,
}

impl<Id: EntityId> Entity<Id> {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            fields: IndexMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, field: impl Into<FieldName>, value: impl Into<Value>) -> Self {
        self.add_field(field, value);
        self
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Look up a field that must be present
    pub fn seek(&self, field: &str) -> ValueResult<&Value> {
        self.fields
            .get(field)
            .ok_or_else(|| ValueError::field_not_found(field))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn field_state(&self, field: &str) -> FieldState {
        if self.fields.contains_key(field) {
            FieldState::Present
        } else {
            FieldState::Absent
        }
    }

    pub fn is_present(&self, field: &str) -> bool {
        self.field_state(field) == FieldState::Present
    }

    /// Field presence through the truth channel.
    ///
    /// Undefined while absent, false when confirmed missing, true otherwise.
    pub fn presence(&self, field: &str) -> TruthValue {
        match self.fields.get(field) {
            None => TruthValue::Undefined,
            Some(value) => TruthValue::from(value.exists()),
        }
    }

    /// Set a field unless it is already present.
    ///
    /// Returns whether the field moved from absent to present.
    pub fn add_field(&mut self, field: impl Into<FieldName>, value: impl Into<Value>) -> bool {
        let field = field.into();
        if self.fields.contains_key(&field) {
            return false;
        }
        self.fields.insert(field, value.into());
        true
    }

    /// Iterate over present fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&FieldName, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copy of this entity restricted to the given fields.
    ///
    /// Fields that are absent here stay absent in the projection.
    pub fn project<S: AsRef<str>>(&self, fields: &[S]) -> Self {
        let mut projected = Self::new(self.id.clone());
        for field in fields {
            if let Some(value) = self.fields.get(field.as_ref()) {
                projected
                    .fields
                    .insert(field.as_ref().to_string(), value.clone());
            }
        }
        projected
    }
}
