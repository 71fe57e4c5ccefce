//! Authenticated repository client
//!
//! `RepositoryClient` sends exactly one request per call: it waits for the
//! rate limiter, applies the bearer credential, and turns any non-2xx
//! response into a structured [`Error`]. Retrying is left to
//! [`RetryPolicy`], which callers wrap around `send`.

use super::rate_limit::RateLimiter;
use super::retry::RetryPolicy;
use crate::auth::{join_path, Authenticator, Credentials};
use crate::config::ClientConfig;
use crate::error::{Error, RepositoryError, RepositoryErrorKind, Result};
use crate::types::JsonValue;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::Url;

/// Response header carrying the server's request id
pub const REQUEST_ID_HEADER: &str = "request-id";

/// HTTP client bound to one repository and one set of credentials.
///
/// Cloning is cheap; clones share the connection pool, the session token
/// and the rate limiter.
#[derive(Clone)]
pub struct RepositoryClient {
    client: Client,
    base_url: Url,
    authenticator: Authenticator,
    rate_limiter: Option<RateLimiter>,
    retry: RetryPolicy,
}

impl RepositoryClient {
    /// Create a client for the configured repository
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()?;

        let authenticator = Authenticator::new(credentials, client.clone(), &base_url)?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            base_url,
            authenticator,
            rate_limiter,
            retry: config.retry,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Retry policy for requests made through this client
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// The credential provider
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// The bearer token requests are sent with, logging in if needed
    pub async fn bearer_token(&self) -> Result<String> {
        self.authenticator.bearer_token().await
    }

    /// Resolve an upstream path against the base URL
    pub fn url(&self, upstream: &str) -> Result<Url> {
        if upstream.starts_with("http://") || upstream.starts_with("https://") {
            return Ok(Url::parse(upstream)?);
        }
        join_path(&self.base_url, upstream)
    }

    /// Send one request, without retrying.
    ///
    /// Non-2xx responses are returned as [`Error::Repository`] or
    /// [`Error::ErrorResponse`].
    pub async fn send(
        &self,
        method: Method,
        upstream: &str,
        query: &[(&str, String)],
        body: Option<&JsonValue>,
    ) -> Result<Response> {
        let url = self.url(upstream)?;

        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self.client.request(method.clone(), url.clone());
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        req = self.authenticator.apply(req).await?;

        debug!("{} {}", method, url);
        let response = req.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let err = error_from_response(response).await;
        if err
            .repository_error()
            .is_some_and(|e| e.kind == RepositoryErrorKind::InvalidToken)
        {
            self.authenticator.invalidate().await;
        }
        Err(err)
    }

    /// GET an endpoint and parse its JSON body, retrying transient failures.
    ///
    /// A body that does not match `T` fails with [`Error::JsonParse`] and is
    /// not retried.
    pub async fn get_json<T: DeserializeOwned>(&self, upstream: &str) -> Result<T> {
        self.retry
            .run(upstream, move || async move {
                let response = self.send(Method::GET, upstream, &[], None).await?;
                let body = response.bytes().await?;
                Ok(serde_json::from_slice::<T>(&body)?)
            })
            .await
    }
}

impl std::fmt::Debug for RepositoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticator", &self.authenticator)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Turn a non-2xx response into an error carrying its request id
pub(crate) async fn error_from_response(response: Response) -> Error {
    let status = response.status().as_u16();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => return Error::Transport(e),
    };

    match serde_json::from_slice::<RepositoryError>(&body) {
        Ok(error) => {
            if !error.kind.is_known() {
                error!("repository returned unknown error kind '{}'", error.kind);
            }
            error!(
                "request {} failed with {}: {}",
                request_id.as_deref().unwrap_or("-"),
                status,
                error
            );
            Error::Repository {
                status,
                request_id,
                error,
            }
        }
        Err(_) => {
            let body = String::from_utf8_lossy(&body).into_owned();
            error!(
                "request {} failed with {} and an unparseable body",
                request_id.as_deref().unwrap_or("-"),
                status
            );
            Error::ErrorResponse {
                status,
                request_id,
                body,
            }
        }
    }
}
