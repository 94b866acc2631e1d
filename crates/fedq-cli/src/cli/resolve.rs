//! Resolve command implementation

use super::output::{self, OutputFormat};
use super::read_query;
use anyhow::{Context, Result};
use colored::Colorize;
use fedq::json::load_sources_from_path;
use fedq::{QueryResult, ResolveError, Resolver, ResultTemplate, SourceRef};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// Exit code reported when no clause of the query can be answered
pub const EXIT_UNSOLVABLE: u8 = 2;

/// Configuration for the resolve command
pub struct ResolveConfig {
    pub query: PathBuf,
    pub sources: PathBuf,
    pub schema: Option<PathBuf>,
    pub fields: Vec<String>,
    pub timeout_ms: Option<u64>,
    pub max_rounds: Option<usize>,
    pub sequential: bool,
    pub format: OutputFormat,
}

/// Resolve a query document against a fixture document
pub async fn resolve(config: ResolveConfig) -> Result<ExitCode> {
    let query = read_query(&config.query)?;
    let template = load_template(&config, || query.field_names())?;

    let sources = load_sources_from_path(&config.sources)
        .with_context(|| format!("Failed to load sources: {}", config.sources.display()))?;
    let mut builder = Resolver::builder().concurrent_sources(!config.sequential);
    for source in sources {
        builder = builder.source_ref(Arc::new(source) as SourceRef<String>);
    }
    if let Some(max_rounds) = config.max_rounds {
        builder = builder.max_rounds(max_rounds);
    }
    if let Some(timeout_ms) = config.timeout_ms {
        builder = builder.timeout(Duration::from_millis(timeout_ms));
    }
    let resolver = builder.build();

    match resolver.process_query(&query, &template.fields()).await {
        Ok(result) => {
            print_result(&result, &template, config.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(ResolveError::Unsolvable) => {
            eprintln!(
                "{} no source can answer any clause of {}",
                "Unsolvable:".red().bold(),
                query
            );
            Ok(ExitCode::from(EXIT_UNSOLVABLE))
        }
        Err(error) => Err(error).context("Query resolution failed"),
    }
}

fn load_template<'a>(config: &ResolveConfig, query_fields: impl FnOnce() -> Vec<&'a str>) -> Result<ResultTemplate> {
    if let Some(path) = &config.schema {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read schema: {}", path.display()))?;
        return ResultTemplate::parse_str(&text).with_context(|| format!("Invalid schema in {}", path.display()));
    }
    if config.fields.is_empty() {
        Ok(ResultTemplate::from_fields(query_fields()))
    } else {
        Ok(ResultTemplate::from_fields(config.fields.iter().cloned()))
    }
}

fn print_result(result: &QueryResult<String>, template: &ResultTemplate, format: OutputFormat) -> Result<()> {
    let unresolved: Vec<String> = result.unresolved.iter().map(ToString::to_string).collect();

    match format {
        OutputFormat::Json => {
            let document = json!({
                "entities": result
                    .entities
                    .iter()
                    .map(|(id, entity)| json!({"id": id, "fields": template.render(entity)}))
                    .collect::<Vec<_>>(),
                "fully_solved": result.fully_solved,
                "unresolved": unresolved,
            });
            println!("{}", output::format_json(&document, true)?);
        }
        OutputFormat::Pretty => {
            for (id, entity) in &result.entities {
                println!("{} {}", id.bold(), output::format_json(&template.render(entity), false)?);
            }
            if result.fully_solved {
                println!("{}", output::format_success(&format!("{} entities", result.len())));
            } else {
                println!(
                    "{}",
                    output::format_warning(&format!(
                        "partial result with {} entities, undecided: {}",
                        result.len(),
                        unresolved.join(", ")
                    ))
                );
            }
        }
    }
    Ok(())
}
