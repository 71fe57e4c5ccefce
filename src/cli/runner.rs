//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, PagingArgs};
use crate::config::{PaginationOptions, RepoConfig};
use crate::error::Result;
use crate::models::Query;
use crate::repository::Repository;
use futures::TryStreamExt;
use serde::Serialize;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        let repository = self.connect(&config)?;

        match &self.cli.command {
            Commands::Count { format_ids } => {
                let count = repository.record_count(&query_for(format_ids)).await?;
                println!("{count}");
                Ok(())
            }
            Commands::Records {
                format_ids,
                paging,
                max_records,
            } => {
                let options = pagination_options(&config, paging);
                self.records(&repository, &query_for(format_ids), &options, *max_records)
                    .await
            }
            Commands::Formats { paging } => {
                let options = pagination_options(&config, paging);
                let mut formats = repository.formats(&options)?;
                while let Some(batch) = formats.try_next().await? {
                    for format in &batch {
                        self.output(format)?;
                    }
                }
                Ok(())
            }
            Commands::Token => {
                println!("{}", repository.token().await?);
                Ok(())
            }
        }
    }

    /// Settings file, or defaults when none was given
    fn load_config(&self) -> Result<RepoConfig> {
        match &self.cli.config {
            Some(path) => RepoConfig::from_yaml_file(path),
            None => Ok(RepoConfig::default()),
        }
    }

    /// Command line flags take precedence over the settings file
    fn connect(&self, config: &RepoConfig) -> Result<Repository> {
        let mut client_config = config.client_config();
        if let Some(url) = &self.cli.url {
            client_config.base_url.clone_from(url);
        }
        let credentials = match &self.cli.auth {
            Some(credentials) => credentials.clone(),
            None => config.credentials()?,
        };
        Repository::connect(client_config, credentials)
    }

    async fn records(
        &self,
        repository: &Repository,
        query: &Query,
        options: &PaginationOptions,
        max_records: Option<usize>,
    ) -> Result<()> {
        let started = Instant::now();
        let limit = max_records.unwrap_or(usize::MAX);
        let mut emitted = 0usize;

        let mut batches = repository.records(query, options)?;
        while emitted < limit {
            let Some(batch) = batches.try_next().await? else {
                break;
            };
            for record in batch.iter().take(limit - emitted) {
                self.output(record)?;
                emitted += 1;
            }
        }
        // Stops any fetch still in flight when the limit was hit
        drop(batches);

        info!(
            "read {} records with the {} strategy in {:.2?}",
            emitted,
            options.strategy,
            started.elapsed()
        );
        Ok(())
    }

    fn output<T: Serialize>(&self, value: &T) -> Result<()> {
        let line = match self.cli.output {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{line}");
        Ok(())
    }
}

fn query_for(format_ids: &[i64]) -> Query {
    format_ids
        .iter()
        .fold(Query::new(), |query, id| query.format(*id))
}

fn pagination_options(config: &RepoConfig, paging: &PagingArgs) -> PaginationOptions {
    let mut options = config.pagination;
    if let Some(strategy) = paging.strategy {
        options.strategy = strategy;
    }
    if let Some(page_size) = paging.page_size {
        options.page_size = page_size;
    }
    if let Some(concurrency) = paging.concurrency {
        options.max_concurrency = concurrency;
    }
    options
}
