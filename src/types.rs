//! Common types used throughout repoclient
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method used for page requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
        }
    }
}

// ============================================================================
// Pagination Strategy
// ============================================================================

/// Algorithm used to traverse every page of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationStrategy {
    /// Counted first page, then the remaining pages one at a time in order
    Default,
    /// Walk pages until the server returns an empty one; no counting
    #[default]
    Fast,
    /// Counted first page, then the remaining pages concurrently
    Parallel,
}

impl fmt::Display for PaginationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Fast => "fast",
            Self::Parallel => "parallel",
        };
        f.write_str(name)
    }
}

impl FromStr for PaginationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "fast" => Ok(Self::Fast),
            "parallel" => Ok(Self::Parallel),
            other => Err(format!(
                "unknown pagination strategy '{other}' (expected default, fast or parallel)"
            )),
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// No delay between retries
    None,
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        let get: reqwest::Method = Method::GET.into();
        assert_eq!(reqwest::Method::GET, get);
        let post: reqwest::Method = Method::POST.into();
        assert_eq!(reqwest::Method::POST, post);
    }

    #[test]
    fn test_strategy_default() {
        assert_eq!(PaginationStrategy::default(), PaginationStrategy::Fast);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "FAST".parse::<PaginationStrategy>().unwrap(),
            PaginationStrategy::Fast
        );
        assert_eq!(
            "parallel".parse::<PaginationStrategy>().unwrap(),
            PaginationStrategy::Parallel
        );
        assert!("sideways".parse::<PaginationStrategy>().is_err());
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: PaginationStrategy = serde_json::from_str("\"default\"").unwrap();
        assert_eq!(strategy, PaginationStrategy::Default);
        assert_eq!(
            serde_json::to_string(&PaginationStrategy::Fast).unwrap(),
            "\"fast\""
        );
    }

    #[test]
    fn test_backoff_serde() {
        let backoff: BackoffType = serde_yaml::from_str("linear").unwrap();
        assert_eq!(backoff, BackoffType::Linear);
    }
}
