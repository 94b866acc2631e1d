//! Fixture-backed sources
//!
//! ```json
//! {"sources": [
//!   {"name": "orders", "fields": ["amount"], "mode": "seed",
//!    "records": {"o1": {"amount": 10, "tags": ["cold"]}, "o2": {"amount": null}}}
//! ]}
//! ```
//!
//! `null` records a confirmed missing value and an array records a list of
//! scalars. `mode` defaults to `decorate`.

use crate::error::{DslError, DslResult};
use fedq_engine::{DataSource, MemorySource, SourceMode, SourceRef};
use fedq_types::{FieldName, Scalar, Value};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureDto {
    sources: Vec<SourceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceDto {
    name: String,
    fields: Vec<FieldName>,
    #[serde(default)]
    mode: ModeDto,
    #[serde(default)]
    records: IndexMap<String, IndexMap<FieldName, RecordValueDto>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecordValueDto {
    List(Vec<Scalar>),
    Scalar(Option<Scalar>),
}

impl From<RecordValueDto> for Value {
    fn from(value: RecordValueDto) -> Self {
        match value {
            RecordValueDto::List(items) => Value::List(items),
            RecordValueDto::Scalar(scalar) => Value::from(scalar),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeDto {
    Seed,
    #[default]
    Decorate,
}

impl From<ModeDto> for SourceMode {
    fn from(mode: ModeDto) -> Self {
        match mode {
            ModeDto::Seed => SourceMode::Seed,
            ModeDto::Decorate => SourceMode::Decorate,
        }
    }
}

impl SourceDto {
    fn into_source(self) -> DslResult<MemorySource<String>> {
        let mut source = MemorySource::new(self.name, self.fields, self.mode.into());
        for (id, record) in self.records {
            for (field, value) in record {
                if !source.declares(&field) {
                    return Err(DslError::UndeclaredField {
                        source_name: source.name().to_string(),
                        field,
                    });
                }
                source.insert(id.clone(), field, Value::from(value));
            }
        }
        log::debug!("Loaded fixture source '{}' with {} records", source.name(), source.len());
        Ok(source)
    }
}

/// Parse a fixture document into sources, in declaration order
pub fn load_sources(text: &str) -> DslResult<Vec<MemorySource<String>>> {
    let fixture: FixtureDto = serde_json::from_str(text)?;
    fixture.sources.into_iter().map(SourceDto::into_source).collect()
}

/// Read and parse a fixture file
pub fn load_sources_from_path(path: impl AsRef<Path>) -> DslResult<Vec<MemorySource<String>>> {
    let text = std::fs::read_to_string(path)?;
    load_sources(&text)
}

/// Like [`load_sources`], ready to hand to a resolver builder
pub fn load_source_refs(text: &str) -> DslResult<Vec<SourceRef<String>>> {
    Ok(load_sources(text)?
        .into_iter()
        .map(|source| Arc::new(source) as SourceRef<String>)
        .collect())
}
