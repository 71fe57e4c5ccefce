//! Users, API keys and format entitlements

use super::types::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: ResourceId,
    pub username: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "active_default")]
    pub active: bool,
}

fn active_default() -> bool {
    true
}

/// An API key usable as a bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: ResourceId,
    pub user_id: ResourceId,
    pub created_at: DateTime<Utc>,
    pub last_rotated_at: DateTime<Utc>,
    #[serde(default = "active_default")]
    pub active: bool,
}

/// Access a user has to a format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Access {
    ReadWrite,
    ReadOnly,
    WriteOnly,
}

impl Access {
    /// Whether records of the format can be read
    pub fn can_read(self) -> bool {
        matches!(self, Self::ReadWrite | Self::ReadOnly)
    }

    /// Whether records can be uploaded to the format
    pub fn can_write(self) -> bool {
        matches!(self, Self::ReadWrite | Self::WriteOnly)
    }
}

/// Grants a user access to a format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatEntitlement {
    pub user_id: ResourceId,
    pub format_id: ResourceId,
    pub access: Access,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
