//! Pagination types and traits
//!
//! Defines the page request/result pair exchanged between the retrieval
//! engine and whatever fetches pages for it.

use crate::error::Result;
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

/// Response header with the total number of pages (count requests only)
pub const PAGE_COUNT_HEADER: &str = "repository-page-count";

/// Response header with the total number of items (count requests only)
pub const ITEM_COUNT_HEADER: &str = "repository-item-count";

/// Lazy sequence of item batches produced by one retrieval
pub type BatchStream<T> = Pin<Box<dyn Stream<Item = Result<Vec<T>>> + Send>>;

/// One page fetch, built fresh for every request
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Resource path, relative to the client's base URL
    pub upstream: Arc<str>,
    /// 0-based page index
    pub page: u64,
    /// Items per page (> 0)
    pub page_size: u32,
    /// HTTP method
    pub method: Method,
    /// Serialized query filter sent as the JSON body
    pub body: Option<Arc<JsonValue>>,
    /// Whether the server should report page and item totals
    pub count: bool,
}

impl PageRequest {
    /// Create a request for the first page
    pub fn new(upstream: impl Into<Arc<str>>, page_size: u32) -> Self {
        Self {
            upstream: upstream.into(),
            page: 0,
            page_size,
            method: Method::GET,
            body: None,
            count: false,
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the query body
    #[must_use]
    pub fn body(mut self, body: Option<Arc<JsonValue>>) -> Self {
        self.body = body;
        self
    }

    /// The same request for another page
    #[must_use]
    pub fn for_page(&self, page: u64, count: bool) -> Self {
        Self {
            page,
            count,
            ..self.clone()
        }
    }

    /// Query string parameters for this request
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("perPage", self.page_size.to_string()),
            ("count", self.count.to_string()),
        ]
    }
}

/// A fetched and decoded page
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    /// Page index this result answers
    pub page: u64,
    /// Decoded items, in server order
    pub items: Vec<T>,
    /// Total pages, present only when counting was requested
    pub page_count: Option<u64>,
    /// Total items, present only when counting was requested
    pub item_count: Option<u64>,
    /// HTTP status of the response
    pub status: u16,
}

impl<T> PageResult<T> {
    /// Whether the page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Something that can fetch one page.
///
/// A single `fetch` call covers every attempt for that page: implementations
/// retry internally and only return the final outcome.
#[async_trait]
pub trait PageSource<T: Send>: Send + Sync {
    /// Fetch and decode the requested page
    async fn fetch(&self, request: &PageRequest) -> Result<PageResult<T>>;
}
