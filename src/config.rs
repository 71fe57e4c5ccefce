//! Configuration types
//!
//! `ClientConfig` describes how to reach the repository, `PaginationOptions`
//! how to traverse a paged resource. Both can be built in code or loaded from
//! a YAML file through [`RepoConfig`].

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::http::{RateLimiterConfig, RetryPolicy};
use crate::types::{Method, PaginationStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::warn;

/// Default repository location
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for the repository client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the repository
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Rate limiter shared by every request of the client
    pub rate_limit: Option<RateLimiterConfig>,
    /// Retry policy applied to every request
    pub retry: RetryPolicy,
    /// Idle connections kept per host by the connection pool
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            user_agent: format!("repoclient/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: None,
            retry: RetryPolicy::default(),
            pool_max_idle_per_host: 32,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load client settings from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(RepoConfig::from_yaml_str(yaml)?.client_config())
    }

    /// Load client settings from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(RepoConfig::from_yaml_file(path)?.client_config())
    }
}

/// Builder for client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the idle connection limit per host
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

// ============================================================================
// Pagination Options
// ============================================================================

/// How a paged resource is traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationOptions {
    /// Items per request
    pub page_size: u32,
    /// Traversal strategy
    pub strategy: PaginationStrategy,
    /// Worker cap for the parallel strategy
    pub max_concurrency: usize,
    /// HTTP method used for page requests
    pub method: Method,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page_size: 1000,
            strategy: PaginationStrategy::Fast,
            max_concurrency: 8,
            method: Method::GET,
        }
    }
}

impl PaginationOptions {
    /// Options with the given strategy and defaults otherwise
    pub fn with_strategy(strategy: PaginationStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Set page size
    #[must_use]
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set max concurrency
    #[must_use]
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the request method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Reject options no session can run with.
    ///
    /// A parallel concurrency that is not a power of two is accepted with a
    /// warning.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_options("page_size must be greater than 0"));
        }
        if self.max_concurrency == 0 {
            return Err(Error::invalid_options(
                "max_concurrency must be greater than 0",
            ));
        }
        if self.max_concurrency > Semaphore::MAX_PERMITS {
            return Err(Error::invalid_options(format!(
                "max_concurrency must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.strategy == PaginationStrategy::Parallel
            && !self.max_concurrency.is_power_of_two()
        {
            warn!(
                "max_concurrency {} is not a power of two, server-side parallelism may be underused",
                self.max_concurrency
            );
        }
        Ok(())
    }
}

// ============================================================================
// Config File
// ============================================================================

/// Settings file consumed by the command line
///
/// ```yaml
/// base_url: https://repository.example.com
/// timeout_seconds: 30
/// retry:
///   max_retries: 5
///   backoff: linear
/// rate_limit:
///   requests_per_second: 20
/// pagination:
///   page_size: 500
///   strategy: parallel
///   max_concurrency: 16
/// auth:
///   username: alice
///   password: hunter2
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Base URL of the repository
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Idle connections kept per host
    #[serde(default)]
    pub pool_max_idle_per_host: Option<usize>,

    /// Retry policy
    #[serde(default)]
    pub retry: RetryPolicy,

    /// Rate limiting (disabled when absent)
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Default pagination options
    #[serde(default)]
    pub pagination: PaginationOptions,

    /// Credentials
    #[serde(default)]
    pub auth: AuthSection,
}

/// Credentials as written in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthSection {
    /// Pre-issued token or API key
    #[serde(default)]
    pub token: Option<String>,
    /// Username for login
    #[serde(default)]
    pub username: Option<String>,
    /// Password for login
    #[serde(default)]
    pub password: Option<String>,
}

impl RepoConfig {
    /// Parse a config from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML config file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Client settings, with defaults for anything not set
    pub fn client_config(&self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            timeout: self
                .timeout_seconds
                .map_or(defaults.timeout, Duration::from_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            rate_limit: self.rate_limit.clone(),
            retry: self.retry.clone(),
            pool_max_idle_per_host: self
                .pool_max_idle_per_host
                .unwrap_or(defaults.pool_max_idle_per_host),
        }
    }

    /// Credentials described by the `auth` section
    pub fn credentials(&self) -> Result<Credentials> {
        let auth = &self.auth;
        match (&auth.token, &auth.username, &auth.password) {
            (Some(_), Some(_), _) => Err(Error::config(
                "auth: set either token or username/password, not both",
            )),
            (Some(token), None, _) => Ok(Credentials::token(token.clone())),
            (None, Some(username), Some(password)) => {
                Ok(Credentials::login(username.clone(), password.clone()))
            }
            (None, Some(_), None) => Err(Error::config("auth: username given without password")),
            (None, None, _) => Ok(Credentials::None),
        }
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::types::BackoffType;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::builder()
            .base_url("https://repo.example.com")
            .timeout(Duration::from_secs(5))
            .rate_limit(RateLimiterConfig::new(10, 10))
            .retry(RetryPolicy::none())
            .build();

        assert_eq!(config.base_url, "https://repo.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(10, 10)));
        assert_eq!(config.retry.max_retries, 0);
    }

    #[test]
    fn test_pagination_defaults() {
        let options = PaginationOptions::default();
        assert_eq!(options.page_size, 1000);
        assert_eq!(options.strategy, PaginationStrategy::Fast);
        assert_eq!(options.max_concurrency, 8);
        assert_eq!(options.method, Method::GET);
    }

    #[test]
    fn test_pagination_validate() {
        assert!(PaginationOptions::default().validate().is_ok());
        assert!(PaginationOptions::default()
            .max_concurrency(3)
            .validate()
            .is_ok());
        assert!(matches!(
            PaginationOptions::default().page_size(0).validate(),
            Err(Error::InvalidOptions { .. })
        ));
        assert!(matches!(
            PaginationOptions::default().max_concurrency(0).validate(),
            Err(Error::InvalidOptions { .. })
        ));
        assert!(PaginationOptions::default()
            .max_concurrency(Semaphore::MAX_PERMITS)
            .validate()
            .is_ok());
        assert!(matches!(
            PaginationOptions::with_strategy(PaginationStrategy::Parallel)
                .max_concurrency(usize::MAX)
                .validate(),
            Err(Error::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_repo_config_yaml() {
        let yaml = r"
base_url: https://repo.example.com/api
timeout_seconds: 15
retry:
  max_retries: 5
  backoff: linear
rate_limit:
  requests_per_second: 20
pagination:
  page_size: 250
  strategy: fast
auth:
  username: alice
  password: hunter2
";
        let config = RepoConfig::from_yaml_str(yaml).unwrap();
        let client = config.client_config();

        assert_eq!(client.base_url, "https://repo.example.com/api");
        assert_eq!(client.timeout, Duration::from_secs(15));
        assert_eq!(client.retry.max_retries, 5);
        assert_eq!(client.retry.backoff_type, BackoffType::Linear);
        assert_eq!(client.rate_limit, Some(RateLimiterConfig::new(20, 50)));

        assert_eq!(config.pagination.page_size, 250);
        assert_eq!(config.pagination.strategy, PaginationStrategy::Fast);
        assert_eq!(config.pagination.max_concurrency, 8);

        assert_eq!(
            config.credentials().unwrap(),
            Credentials::login("alice", "hunter2")
        );
    }

    #[test]
    fn test_repo_config_empty_uses_defaults() {
        let config = RepoConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.client_config(), ClientConfig::default());
        assert_eq!(config.credentials().unwrap(), Credentials::None);
    }

    #[test]
    fn test_repo_config_conflicting_auth() {
        let config = RepoConfig::from_yaml_str("auth:\n  token: abc\n  username: alice\n").unwrap();
        assert!(matches!(config.credentials(), Err(Error::Config { .. })));

        let config = RepoConfig::from_yaml_str("auth:\n  username: alice\n").unwrap();
        assert!(matches!(config.credentials(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_client_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://10.0.0.5:8000\nauth:\n  token: abc").unwrap();

        let config = ClientConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://10.0.0.5:8000");

        let repo = RepoConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(repo.credentials().unwrap(), Credentials::token("abc"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = RepoConfig::from_yaml_file("/definitely/not/here.yaml");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
