//! Auth configuration types

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// How the client proves its identity to the repository
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credentials {
    /// No authentication (only public endpoints such as `/login` will work)
    #[default]
    None,

    /// Pre-issued bearer token or API key
    Token(String),

    /// Username and password, exchanged for a token at `/login`
    Login {
        /// Username
        username: String,
        /// Password
        password: String,
    },
}

impl Credentials {
    /// Bearer token credentials
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }

    /// Username/password credentials
    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Login {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Self::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Parses `token:<TOKEN>` or `basic:<USERNAME>:<PASSWORD>`
impl FromStr for Credentials {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mode, rest) = s
            .split_once(':')
            .ok_or_else(|| "invalid auth format, expected '<mode>:<credentials>'".to_string())?;
        match mode {
            "token" => {
                let token = rest.trim();
                if token.is_empty() {
                    return Err("empty token".to_string());
                }
                Ok(Self::token(token))
            }
            "basic" => {
                let (username, password) = rest.split_once(':').ok_or_else(|| {
                    "invalid auth format, expected 'basic:<username>:<password>'".to_string()
                })?;
                Ok(Self::login(username, password))
            }
            other => Err(format!(
                "invalid auth mode '{other}', possible choices: 'basic', 'token'"
            )),
        }
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}
