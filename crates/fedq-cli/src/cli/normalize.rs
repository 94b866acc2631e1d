//! Normalize command implementation

use super::read_query;
use anyhow::Result;
use colored::Colorize;
use fedq::{to_dnf, to_nnf};
use std::path::PathBuf;
use std::process::ExitCode;

/// Configuration for the normalize command
pub struct NormalizeConfig {
    pub query: PathBuf,
}

/// Print the query, its NNF and each DNF clause
pub fn normalize(config: NormalizeConfig) -> Result<ExitCode> {
    let query = read_query(&config.query)?;
    let dnf = to_dnf(&query);

    println!("{} {}", "query:".cyan().bold(), query);
    println!("{} {}", "nnf:".cyan().bold(), to_nnf(&query));
    println!("{} {} clause(s)", "dnf:".cyan().bold(), dnf.len());
    for (index, clause) in dnf.clauses().iter().enumerate() {
        println!("  {}: {}", index + 1, clause);
    }

    Ok(ExitCode::SUCCESS)
}
