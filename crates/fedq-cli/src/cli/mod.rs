//! Command implementations

pub mod normalize;
pub mod output;
pub mod resolve;

use anyhow::{Context, Result};
use fedq::{Comparison, QueryParser};
use std::fs;
use std::path::Path;

/// Read and parse a query document
pub fn read_query(path: &Path) -> Result<Comparison> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read query: {}", path.display()))?;
    QueryParser::new()
        .parse_str(&text)
        .with_context(|| format!("Invalid query in {}", path.display()))
}
