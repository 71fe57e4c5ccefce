//! CLI module
//!
//! Command-line interface for querying a repository.
//!
//! # Commands
//!
//! - `count` - Count records, optionally for given formats
//! - `records` - Stream records as JSON
//! - `formats` - List formats visible to the user
//! - `token` - Print the bearer token (logging in if needed)

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
