//! HTTP page fetcher
//!
//! Turns a [`PageRequest`] into one request against the repository, reads the
//! count headers when they were asked for, and decodes the body.

use super::decode::{decode_page, DecodePool};
use super::types::{PageRequest, PageResult, PageSource, ITEM_COUNT_HEADER, PAGE_COUNT_HEADER};
use crate::error::{Error, Result};
use crate::http::RepositoryClient;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::debug;

/// Fetches pages of `T` from the repository
pub struct PageFetcher<T> {
    client: RepositoryClient,
    pool: Option<DecodePool>,
    _item: PhantomData<fn() -> T>,
}

impl<T> PageFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Create a fetcher decoding inline
    pub fn new(client: RepositoryClient) -> Self {
        Self {
            client,
            pool: None,
            _item: PhantomData,
        }
    }

    /// Decode page bodies on the given pool
    #[must_use]
    pub fn with_pool(mut self, pool: DecodePool) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Fetch a page with a single attempt
    pub async fn fetch_once(&self, request: &PageRequest) -> Result<PageResult<T>> {
        let response = send_page(&self.client, request).await?;
        let status = response.status().as_u16();

        let (page_count, item_count) = if request.count {
            let (pages, items) = read_counts(response.headers())?;
            debug!(
                "{} reports {} pages, {} items",
                request.upstream, pages, items
            );
            (Some(pages), Some(items))
        } else {
            (None, None)
        };

        let body = response.bytes().await?;
        let items = match &self.pool {
            Some(pool) => pool.decode(request.page, body).await?,
            None => decode_page(request.page, &body)?,
        };

        Ok(PageResult {
            page: request.page,
            items,
            page_count,
            item_count,
            status,
        })
    }
}

#[async_trait]
impl<T> PageSource<T> for PageFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch(&self, request: &PageRequest) -> Result<PageResult<T>> {
        let what = format!("{} page {}", request.upstream, request.page);
        self.client
            .retry_policy()
            .run(&what, move || self.fetch_once(request))
            .await
    }
}

/// Fetch only the page and item totals for a request, with a single attempt.
///
/// The response body is never read.
pub async fn fetch_counts(client: &RepositoryClient, request: &PageRequest) -> Result<(u64, u64)> {
    let response = send_page(client, request).await?;
    read_counts(response.headers())
}

async fn send_page(client: &RepositoryClient, request: &PageRequest) -> Result<Response> {
    debug!("fetching {} page {}", request.upstream, request.page);
    client
        .send(
            request.method.into(),
            &request.upstream,
            &request.query_params(),
            request.body.as_deref(),
        )
        .await
}

/// Read `(page_count, item_count)` from the response headers.
///
/// Absent or non-integer headers are a protocol violation.
pub(crate) fn read_counts(headers: &HeaderMap) -> Result<(u64, u64)> {
    Ok((
        count_header(headers, PAGE_COUNT_HEADER)?,
        count_header(headers, ITEM_COUNT_HEADER)?,
    ))
}

fn count_header(headers: &HeaderMap, name: &str) -> Result<u64> {
    let value = headers
        .get(name)
        .ok_or_else(|| Error::protocol(format!("count requested but '{name}' header is missing")))?;
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| Error::protocol(format!("'{name}' header is not a non-negative integer")))
}
