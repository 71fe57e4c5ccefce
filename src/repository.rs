//! Typed access to repository resources
//!
//! `Repository` wraps a [`RepositoryClient`] and runs each listing through
//! the pagination engine with the item type fixed per endpoint.

use crate::auth::Credentials;
use crate::config::{ClientConfig, PaginationOptions};
use crate::error::Result;
use crate::http::RepositoryClient;
use crate::models::{ApiKey, Format, FormatEntitlement, Query, Record, UploadSession, User};
use crate::pagination::{get_all, get_all_with_pool, get_count, BatchStream, DecodePool};
use crate::types::Method;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Endpoint paths
pub mod endpoints {
    pub const FORMAT: &str = "/format";
    pub const RECORD_FILTER: &str = "/record/filter";
    pub const USER: &str = "/user";
    pub const API_KEY: &str = "/user/api-key";
    pub const ENTITLEMENT: &str = "/entitlement";
    pub const UPLOAD_SESSION: &str = "/upload_session";
}

const NO_FORMAT_WARNING: &str = "querying the repository without a format id returns every \
record available to this user and can be significantly slower, consider filtering by format";

/// Client for the repository's resources
#[derive(Debug, Clone)]
pub struct Repository {
    client: RepositoryClient,
    pool: Option<DecodePool>,
}

impl Repository {
    /// Connect with the given settings and credentials
    pub fn connect(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        Ok(Self::new(RepositoryClient::new(config, credentials)?))
    }

    /// Wrap an existing client
    pub fn new(client: RepositoryClient) -> Self {
        Self { client, pool: None }
    }

    /// Decode page bodies on `pool` instead of inline
    #[must_use]
    pub fn with_decode_pool(mut self, pool: DecodePool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// The underlying client
    pub fn client(&self) -> &RepositoryClient {
        &self.client
    }

    /// Bearer token used for requests, logging in first if needed
    pub async fn token(&self) -> Result<String> {
        self.client.bearer_token().await
    }

    /// Formats visible to the user
    pub fn formats(&self, options: &PaginationOptions) -> Result<BatchStream<Format>> {
        self.list(endpoints::FORMAT, options, None)
    }

    /// A single format
    pub async fn format(&self, id: impl std::fmt::Display) -> Result<Format> {
        self.client
            .get_json(&format!("{}/{}", endpoints::FORMAT, id))
            .await
    }

    /// Records matching `query`
    pub fn records(&self, query: &Query, options: &PaginationOptions) -> Result<BatchStream<Record>> {
        if !query.has_format_filter() {
            warn!("{}", NO_FORMAT_WARNING);
        }
        self.list(endpoints::RECORD_FILTER, options, Some(query))
    }

    /// Number of records matching `query`
    pub async fn record_count(&self, query: &Query) -> Result<u64> {
        if !query.has_format_filter() {
            warn!("{}", NO_FORMAT_WARNING);
        }
        get_count(
            &self.client,
            endpoints::RECORD_FILTER,
            Method::GET,
            Some(query.to_json()?),
        )
        .await
    }

    /// All users (administrators only)
    pub fn users(&self, options: &PaginationOptions) -> Result<BatchStream<User>> {
        self.list(endpoints::USER, options, None)
    }

    /// API keys of the user
    pub fn api_keys(&self, options: &PaginationOptions) -> Result<BatchStream<ApiKey>> {
        self.list(endpoints::API_KEY, options, None)
    }

    /// Format entitlements visible to the user
    pub fn entitlements(
        &self,
        options: &PaginationOptions,
    ) -> Result<BatchStream<FormatEntitlement>> {
        self.list(endpoints::ENTITLEMENT, options, None)
    }

    /// Upload sessions visible to the user
    pub fn upload_sessions(&self, options: &PaginationOptions) -> Result<BatchStream<UploadSession>> {
        self.list(endpoints::UPLOAD_SESSION, options, None)
    }

    fn list<T>(
        &self,
        upstream: &str,
        options: &PaginationOptions,
        query: Option<&Query>,
    ) -> Result<BatchStream<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let body = query.map(Query::to_json).transpose()?;
        match &self.pool {
            Some(pool) => get_all_with_pool(&self.client, upstream, options, body, pool),
            None => get_all(&self.client, upstream, options, body),
        }
    }
}
