//! HTTP module
//!
//! Provides the authenticated repository client, the retry policy that wraps
//! individual requests, and an optional token-bucket rate limiter.
//!
//! # Features
//!
//! - **Single-attempt requests**: `RepositoryClient` sends exactly one request
//!   and turns non-2xx responses into structured errors
//! - **Automatic Retries**: `RetryPolicy` re-issues transient failures with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;
mod retry;

pub use client::{RepositoryClient, REQUEST_ID_HEADER};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use retry::RetryPolicy;

pub(crate) use client::error_from_response;

#[cfg(test)]
mod tests;
