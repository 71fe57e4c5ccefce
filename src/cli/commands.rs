//! CLI commands and argument parsing

use crate::auth::Credentials;
use crate::types::PaginationStrategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Repository client CLI
#[derive(Parser, Debug)]
#[command(name = "repoclient")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository base URL
    #[arg(short, long, global = true, env = "REPOSITORY_URL")]
    pub url: Option<String>,

    /// Credentials: token:<TOKEN> or basic:<USERNAME>:<PASSWORD>
    #[arg(short, long, global = true, env = "REPOSITORY_AUTH", hide_env_values = true)]
    pub auth: Option<Credentials>,

    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Count records
    Count {
        /// Only count records of these formats
        #[arg(short, long = "format-id")]
        format_ids: Vec<i64>,
    },

    /// Stream records, one JSON document per line
    Records {
        /// Only read records of these formats
        #[arg(short, long = "format-id")]
        format_ids: Vec<i64>,

        #[command(flatten)]
        paging: PagingArgs,

        /// Stop after this many records
        #[arg(long)]
        max_records: Option<usize>,
    },

    /// List formats
    Formats {
        #[command(flatten)]
        paging: PagingArgs,
    },

    /// Print the bearer token
    Token,
}

/// Pagination overrides
#[derive(clap::Args, Debug, Default, Clone)]
pub struct PagingArgs {
    /// Pagination strategy (default, fast, parallel)
    #[arg(long)]
    pub strategy: Option<PaginationStrategy>,

    /// Items per request
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Concurrent requests for the parallel strategy
    #[arg(long)]
    pub concurrency: Option<usize>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one document per line)
    Json,
    /// Human-readable output
    Pretty,
}
