//! Authenticator implementation
//!
//! Applies the bearer credential to requests and manages the session token
//! obtained by logging in.

use super::types::{CachedToken, Credentials};
use crate::error::{Error, Result};
use crate::http::error_from_response;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

/// Login request body
#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

/// Login response body
#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// Authenticator handles applying authentication to HTTP requests
#[derive(Clone)]
pub struct Authenticator {
    credentials: Credentials,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: Client,
    login_url: Option<Url>,
}

impl Authenticator {
    /// Create an authenticator.
    ///
    /// `base_url` is where `/login` lives; it is only used for
    /// [`Credentials::Login`].
    pub fn new(credentials: Credentials, http_client: Client, base_url: &Url) -> Result<Self> {
        let login_url = match credentials {
            Credentials::Login { .. } => Some(join_path(base_url, "login")?),
            _ => None,
        };
        Ok(Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
            login_url,
        })
    }

    /// The configured credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.credentials {
            Credentials::None => Ok(req),
            Credentials::Token(token) => Ok(req.bearer_auth(token)),
            Credentials::Login { .. } => {
                let token = self.session_token().await?;
                Ok(req.bearer_auth(token))
            }
        }
    }

    /// The bearer token requests are sent with, logging in if needed
    pub async fn bearer_token(&self) -> Result<String> {
        match &self.credentials {
            Credentials::None => Err(Error::auth("no credentials configured")),
            Credentials::Token(token) => Ok(token.clone()),
            Credentials::Login { .. } => self.session_token().await,
        }
    }

    /// Forget the session token so the next request logs in again
    pub async fn invalidate(&self) {
        if matches!(self.credentials, Credentials::Login { .. }) {
            debug!("discarding cached session token");
            *self.cached_token.write().await = None;
        }
    }

    /// Get a valid session token, logging in if necessary
    async fn session_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have logged in while we waited for the write lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.login().await?;
        let token = new_token.token.clone();
        *cached = Some(new_token);
        Ok(token)
    }

    /// Exchange username and password for a token
    async fn login(&self) -> Result<CachedToken> {
        let (Credentials::Login { username, password }, Some(login_url)) =
            (&self.credentials, &self.login_url)
        else {
            return Err(Error::auth("login requires username and password"));
        };

        info!("logging in as {}", username);
        let response = self
            .http_client
            .post(login_url.clone())
            .json(&LoginBody { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("unexpected login response: {e}")))?;
        Ok(CachedToken::new(body.token, None))
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("credentials", &self.credentials)
            .field("login_url", &self.login_url)
            .finish_non_exhaustive()
    }
}

/// Append `path` to `base`, keeping any path prefix `base` already has
pub(crate) fn join_path(base: &Url, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&joined)?)
}
