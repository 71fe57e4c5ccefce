//! Repository resources
//!
//! Typed items retrieved through the pagination engine, and the record
//! query body builder.

mod format;
mod query;
mod record;
mod types;
mod user;

pub use format::{ColumnKind, ColumnSchema, Format};
pub use query::{Column, ComparisonOperator, ConditionKind, Query, QueryGroup};
pub use record::{Record, UploadOutcome, UploadSession};
pub use types::ResourceId;
pub use user::{Access, ApiKey, FormatEntitlement, User};
