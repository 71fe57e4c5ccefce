//! Record query body
//!
//! The repository filters records with a list of condition groups. Each
//! group combines column comparisons with `all` (AND) or `any` (OR) and can
//! be negated; groups are AND-ed together.
//!
//! ```
//! use repoclient::models::{Column, Query, QueryGroup};
//!
//! let query = Query::new()
//!     .format(4)
//!     .group(QueryGroup::all([Column::gte("temperature", 20), Column::lt("temperature", 30)]))
//!     .group(QueryGroup::any([Column::eq("station", "north")]).negate());
//!
//! assert!(query.has_format_filter());
//! ```

use super::types::ResourceId;
use crate::error::Result;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// How a column is compared against a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    Regex,
    RegexCaseInsensitive,
    In,
}

/// A single column comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub column: String,
    #[serde(rename = "comparisonOperator")]
    pub operator: ComparisonOperator,
    #[serde(rename = "compareAgainst")]
    pub value: JsonValue,
}

impl Column {
    /// Compare `column` against `value` with `operator`
    pub fn new(
        column: impl Into<String>,
        operator: ComparisonOperator,
        value: impl Into<JsonValue>,
    ) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, ComparisonOperator::Eq, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, ComparisonOperator::Gt, value)
    }

    pub fn gte(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, ComparisonOperator::Gte, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, ComparisonOperator::Lt, value)
    }

    pub fn lte(column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self::new(column, ComparisonOperator::Lte, value)
    }

    /// SQL `LIKE` pattern match
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, ComparisonOperator::Like, pattern.into())
    }

    /// Case-insensitive `LIKE`
    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, ComparisonOperator::ILike, pattern.into())
    }

    pub fn regex(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, ComparisonOperator::Regex, pattern.into())
    }

    pub fn regex_case_insensitive(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, ComparisonOperator::RegexCaseInsensitive, pattern.into())
    }

    /// Match any of `values`
    pub fn is_in<V: Into<JsonValue>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<JsonValue> = values.into_iter().map(Into::into).collect();
        Self::new(column, ComparisonOperator::In, values)
    }
}

/// How the comparisons of a group combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    #[default]
    All,
    Any,
}

/// A group of comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryGroup {
    #[serde(rename = "conditionKind", default)]
    pub kind: ConditionKind,
    #[serde(rename = "not", default)]
    pub negated: bool,
    pub args: Vec<Column>,
}

impl QueryGroup {
    /// Every comparison must hold
    pub fn all(args: impl IntoIterator<Item = Column>) -> Self {
        Self {
            kind: ConditionKind::All,
            negated: false,
            args: args.into_iter().collect(),
        }
    }

    /// At least one comparison must hold
    pub fn any(args: impl IntoIterator<Item = Column>) -> Self {
        Self {
            kind: ConditionKind::Any,
            negated: false,
            args: args.into_iter().collect(),
        }
    }

    /// Invert the group
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negated = true;
        self
    }
}

/// Record filter sent as the body of `/record/filter`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    /// Formats to read from; all readable formats when absent
    #[serde(rename = "formats", default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<ResourceId>>,
    #[serde(default)]
    pub query: Vec<QueryGroup>,
}

impl Query {
    /// A query matching every record the user can read
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a format (may be called repeatedly)
    #[must_use]
    pub fn format(mut self, id: impl Into<ResourceId>) -> Self {
        self.formats.get_or_insert_with(Vec::new).push(id.into());
        self
    }

    /// Add a condition group
    #[must_use]
    pub fn group(mut self, group: QueryGroup) -> Self {
        self.query.push(group);
        self
    }

    /// Whether the query names at least one format
    pub fn has_format_filter(&self) -> bool {
        self.formats.as_ref().is_some_and(|f| !f.is_empty())
    }

    /// Serialize to the JSON body the server expects
    pub fn to_json(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }
}
