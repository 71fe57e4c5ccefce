//! Records and the upload sessions that created them

use super::types::ResourceId;
use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: ResourceId,
    pub upload_session_id: ResourceId,
    /// Column name to value, as defined by the record's format
    pub data: JsonObject,
}

impl Record {
    /// Value of a column
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.data.get(column)
    }
}

/// Result of an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadOutcome {
    #[serde(alias = "SUCCESS")]
    Success,
    #[serde(alias = "ERROR")]
    Error,
}

/// One upload of records against a format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub id: ResourceId,
    pub created_at: DateTime<Utc>,
    pub record_count: u64,
    pub format_id: ResourceId,
    pub user_id: ResourceId,
    pub outcome: UploadOutcome,
    #[serde(default)]
    pub detail: String,
}
