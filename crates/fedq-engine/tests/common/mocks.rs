//! Mock data sources

use async_trait::async_trait;
use fedq_engine::{DataSource, Retrieval, SourceError};
use fedq_expr::Comparison;
use fedq_types::{Entities, FieldName};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

/// Declares fields but never has anything to contribute
pub struct StallingSource {
    fields: Vec<FieldName>,
    calls: Mutex<usize>,
}

impl StallingSource {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl DataSource<u32> for StallingSource {
    fn name(&self) -> &str {
        "stalling"
    }

    fn retrievable_fields(&self) -> &[FieldName] {
        &self.fields
    }

    async fn retrieve(&self, _query: &Comparison, _entities: &Entities<u32>) -> Result<Retrieval<u32>, SourceError> {
        *self.calls.lock() += 1;
        Ok(Retrieval::not_applied())
    }
}

/// Fails every call
pub struct FailingSource {
    fields: Vec<FieldName>,
}

impl FailingSource {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

#[async_trait]
impl DataSource<u32> for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn retrievable_fields(&self) -> &[FieldName] {
        &self.fields
    }

    async fn retrieve(&self, _query: &Comparison, _entities: &Entities<u32>) -> Result<Retrieval<u32>, SourceError> {
        Err(SourceError::unavailable("connection refused"))
    }
}

/// Sleeps before delegating to another source
pub struct SlowSource<S> {
    inner: S,
    delay: Duration,
}

impl<S> SlowSource<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<S: DataSource<u32>> DataSource<u32> for SlowSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn retrievable_fields(&self) -> &[FieldName] {
        self.inner.retrievable_fields()
    }

    async fn retrieve(&self, query: &Comparison, entities: &Entities<u32>) -> Result<Retrieval<u32>, SourceError> {
        tokio::time::sleep(self.delay).await;
        self.inner.retrieve(query, entities).await
    }
}

/// Waits on a shared barrier before delegating, so a round only completes
/// when every source sharing the barrier is called at the same time
pub struct RendezvousSource<S> {
    inner: S,
    barrier: Arc<Barrier>,
}

impl<S> RendezvousSource<S> {
    pub fn new(inner: S, barrier: Arc<Barrier>) -> Self {
        Self { inner, barrier }
    }
}

#[async_trait]
impl<S: DataSource<u32>> DataSource<u32> for RendezvousSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn retrievable_fields(&self) -> &[FieldName] {
        self.inner.retrievable_fields()
    }

    async fn retrieve(&self, query: &Comparison, entities: &Entities<u32>) -> Result<Retrieval<u32>, SourceError> {
        self.barrier.wait().await;
        self.inner.retrieve(query, entities).await
    }
}
