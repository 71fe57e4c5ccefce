//! Page body decoding
//!
//! Pages decode inline by default. A [`DecodePool`] moves decoding onto
//! tokio's blocking threads so large pages do not stall the scheduler; it is
//! created and shut down explicitly by its owner and can be shared by any
//! number of sessions.

use crate::error::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

/// Decode a page body (a JSON array) into items
pub fn decode_page<T: DeserializeOwned>(page: u64, body: &[u8]) -> Result<Vec<T>> {
    serde_json::from_slice(body).map_err(|e| Error::deserialization(page, e.to_string()))
}

/// Bounded pool of blocking decode workers
#[derive(Debug, Clone)]
pub struct DecodePool {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl DecodePool {
    /// Create a pool running at most `workers` decodes at once (minimum 1)
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    /// Number of decodes that may run at once
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Decode a page body on a blocking worker
    pub async fn decode<T>(&self, page: u64, body: Bytes) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::PoolClosed)?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            decode_page(page, &body)
        })
        .await?
    }

    /// Stop accepting work; decodes already running finish normally
    pub fn shutdown(&self) {
        debug!("shutting down decode pool");
        self.permits.close();
    }

    /// Whether [`shutdown`](Self::shutdown) has been called
    pub fn is_shutdown(&self) -> bool {
        self.permits.is_closed()
    }
}

impl Default for DecodePool {
    fn default() -> Self {
        let workers = std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get);
        Self::new(workers)
    }
}

#[cfg(test)]
mod decode_tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: u32,
    }

    #[test]
    fn test_decode_inline() {
        let rows: Vec<Row> = decode_page(0, br#"[{"id": 1}, {"id": 2}]"#).unwrap();
        assert_eq!(rows, vec![Row { id: 1 }, Row { id: 2 }]);
    }

    #[test]
    fn test_decode_mismatch_names_page() {
        let err = decode_page::<Row>(4, br#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, Error::Deserialization { page: 4, .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_pool_decodes() {
        let pool = DecodePool::new(2);
        let rows: Vec<Row> = pool
            .decode(1, Bytes::from_static(br#"[{"id": 7}]"#))
            .await
            .unwrap();
        assert_eq!(rows, vec![Row { id: 7 }]);
    }

    #[tokio::test]
    async fn test_pool_shutdown_rejects_work() {
        let pool = DecodePool::new(1);
        let shared = pool.clone();
        pool.shutdown();

        assert!(shared.is_shutdown());
        let result = shared
            .decode::<Row>(0, Bytes::from_static(b"[]"))
            .await;
        assert!(matches!(result, Err(Error::PoolClosed)));
    }

    #[test]
    fn test_pool_minimum_one_worker() {
        assert_eq!(DecodePool::new(0).workers(), 1);
    }
}
