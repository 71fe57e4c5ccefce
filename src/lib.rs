// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # repoclient
//!
//! Async client for a tabular data repository: formats (named schemas),
//! record queries, users and entitlements, all read through one paginated,
//! concurrency-bounded retrieval engine.
//!
//! ## Features
//!
//! - **Three pagination strategies**: fast (walk until empty), default
//!   (counted, in order) and parallel (counted, bounded fan-out)
//! - **Deterministic cancellation**: dropping a stream aborts every fetch still
//!   outstanding; the first failure does the same before it is reported
//! - **Retries**: transient failures (transport, 5xx, 429) are retried with
//!   configurable backoff; business errors surface immediately with the
//!   server's request id
//! - **Auth**: bearer token / API key, or username and password login
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//! use repoclient::models::{Column, Query, QueryGroup};
//! use repoclient::{ClientConfig, Credentials, PaginationOptions, Repository};
//!
//! #[tokio::main]
//! async fn main() -> repoclient::Result<()> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:8000")
//!         .build();
//!     let repository = Repository::connect(config, Credentials::login("alice", "secret"))?;
//!
//!     let query = Query::new()
//!         .format(4)
//!         .group(QueryGroup::all([Column::gt("temperature", 20)]));
//!     println!("{} matching records", repository.record_count(&query).await?);
//!
//!     let mut batches = repository.records(&query, &PaginationOptions::default())?;
//!     while let Some(batch) = batches.try_next().await? {
//!         for record in batch {
//!             println!("{:?}", record.data);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Repository: formats() records() record_count() users() ...     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  pagination: get_all() → Stream<Vec<T>>     get_count() → u64   │
//! │  RetrievalSession → DeliveryQueue (JoinSet + Semaphore)         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────┬───────────────┴───────┬─────────────────────────┐
//! │   Auth       │   HTTP                │   Decode                │
//! ├──────────────┼───────────────────────┼─────────────────────────┤
//! │ Token        │ RepositoryClient      │ inline                  │
//! │ Login        │ RetryPolicy           │ DecodePool              │
//! │              │ RateLimiter           │                         │
//! └──────────────┴───────────────────────┴─────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client and pagination configuration
pub mod config;

/// Authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Paginated retrieval engine
pub mod pagination;

/// Repository resources and query builder
pub mod models;

/// Typed access to repository resources
pub mod repository;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, RepositoryError, RepositoryErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::Credentials;
pub use config::{ClientConfig, PaginationOptions, RepoConfig};
pub use http::{RepositoryClient, RetryPolicy};
pub use pagination::{get_all, get_count, BatchStream, DecodePool};
pub use repository::Repository;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
