//! fedq command-line interface

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use cli::normalize::NormalizeConfig;
use cli::output::{self, OutputFormat};
use cli::resolve::ResolveConfig;
use std::path::PathBuf;
use std::process::ExitCode;

/// fedq command-line tool
#[derive(Parser)]
#[command(name = "fedq")]
#[command(author, version, about = "Resolve queries across partial data sources", long_about = None)]
struct Cli {
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a query against fixture sources and print the matches
    Resolve {
        /// Query document
        #[arg(short, long)]
        query: PathBuf,
        /// Fixture document declaring the sources
        #[arg(short, long)]
        sources: PathBuf,
        /// Result template
        #[arg(long, conflicts_with = "fields")]
        schema: Option<PathBuf>,
        /// Field to return, repeatable (default: the query's fields)
        #[arg(short = 'f', long = "field")]
        fields: Vec<String>,
        /// Deadline for the whole query, in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Round limit per clause
        #[arg(long)]
        max_rounds: Option<usize>,
        /// Ask sources one at a time
        #[arg(long)]
        sequential: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
    /// Print the negation and disjunctive normal forms of a query
    Normalize {
        /// Query document
        #[arg(short, long)]
        query: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Resolve {
            query,
            sources,
            schema,
            fields,
            timeout_ms,
            max_rounds,
            sequential,
            format,
        } => {
            cli::resolve::resolve(ResolveConfig {
                query,
                sources,
                schema,
                fields,
                timeout_ms,
                max_rounds,
                sequential,
                format,
            })
            .await
        }
        Commands::Normalize { query } => cli::normalize::normalize(NormalizeConfig { query }),
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", output::format_error(&error));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
