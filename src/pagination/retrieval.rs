//! Pagination facade
//!
//! `get_all` picks the strategy from [`PaginationOptions`] and returns a lazy
//! stream of item batches; `get_count` asks the server for the item total
//! with a single one-item page request.

use super::decode::DecodePool;
use super::engine::RetrievalSession;
use super::fetcher::{fetch_counts, PageFetcher};
use super::types::{BatchStream, PageRequest};
use crate::config::PaginationOptions;
use crate::error::{Error, Result};
use crate::http::RepositoryClient;
use crate::types::{JsonValue, Method};
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Retrieve every item of `upstream`, batch by batch.
///
/// Nothing is requested until the stream is polled. Dropping the stream
/// cancels any fetch still outstanding.
///
/// # Example
///
/// ```no_run
/// use futures::TryStreamExt;
/// use repoclient::{get_all, ClientConfig, Credentials, PaginationOptions, RepositoryClient};
///
/// # async fn run() -> repoclient::Result<()> {
/// let client = RepositoryClient::new(ClientConfig::default(), Credentials::token("abc"))?;
/// let mut batches = get_all::<serde_json::Value>(
///     &client,
///     "/record/filter",
///     &PaginationOptions::default(),
///     None,
/// )?;
/// while let Some(batch) = batches.try_next().await? {
///     println!("{} records", batch.len());
/// }
/// # Ok(())
/// # }
/// ```
pub fn get_all<T>(
    client: &RepositoryClient,
    upstream: &str,
    options: &PaginationOptions,
    query: Option<JsonValue>,
) -> Result<BatchStream<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let fetcher = PageFetcher::<T>::new(client.clone());
    let session = RetrievalSession::<T>::new(Arc::new(fetcher), upstream, *options, query)?;
    Ok(session.into_stream())
}

/// Like [`get_all`], decoding page bodies on `pool`
pub fn get_all_with_pool<T>(
    client: &RepositoryClient,
    upstream: &str,
    options: &PaginationOptions,
    query: Option<JsonValue>,
    pool: &DecodePool,
) -> Result<BatchStream<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    if pool.is_shutdown() {
        return Err(Error::PoolClosed);
    }
    let fetcher = PageFetcher::<T>::new(client.clone()).with_pool(pool.clone());
    let session = RetrievalSession::<T>::new(Arc::new(fetcher), upstream, *options, query)?;
    Ok(session.into_stream())
}

/// Total number of items `upstream` holds for `query`.
///
/// Issues one `page=0, perPage=1, count=true` request (retried on transient
/// failure) and never decodes the item payload.
pub async fn get_count(
    client: &RepositoryClient,
    upstream: &str,
    method: Method,
    query: Option<JsonValue>,
) -> Result<u64> {
    let request = PageRequest::new(upstream, 1)
        .method(method)
        .body(query.map(Arc::new))
        .for_page(0, true);

    let request = &request;
    let (_, items) = client
        .retry_policy()
        .run("count", move || fetch_counts(client, request))
        .await?;
    Ok(items)
}

/// Flatten a batch stream into a stream of single items
pub fn into_items<T: Send + 'static>(batches: BatchStream<T>) -> impl Stream<Item = Result<T>> {
    batches
        .map_ok(|batch| futures::stream::iter(batch.into_iter().map(Ok)))
        .try_flatten()
}
