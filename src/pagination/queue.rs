//! Delivery queue
//!
//! Bridges page fetch tasks to the single consumer loop. Results come out in
//! completion order. A semaphore bounds how many fetches execute at once;
//! spawning itself is unbounded.

use super::types::{PageRequest, PageResult, PageSource};
use crate::error::{Error, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

type Outcome<T> = (u64, Result<PageResult<T>>);

/// Completion-order queue of page fetch tasks owned by one session
pub(crate) struct DeliveryQueue<T> {
    tasks: JoinSet<Outcome<T>>,
    permits: Arc<Semaphore>,
}

impl<T: Send + 'static> DeliveryQueue<T> {
    /// Create a queue allowing `max_concurrency` fetches at once
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            tasks: JoinSet::new(),
            permits: Arc::new(Semaphore::new(max_concurrency)),
        }
    }

    /// Schedule a fetch; it runs once a permit is free
    pub fn spawn(&mut self, source: Arc<dyn PageSource<T>>, request: PageRequest) {
        let permits = Arc::clone(&self.permits);
        self.tasks.spawn(async move {
            let page = request.page;
            let Ok(permit) = permits.acquire_owned().await else {
                return (page, Err(Error::Cancelled));
            };
            let outcome = source.fetch(&request).await;
            drop(permit);
            (page, outcome)
        });
    }

    /// Tasks spawned but not yet pulled
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for the next task to finish.
    ///
    /// `None` once every spawned task has been pulled. A failed fetch is
    /// reported as [`Error::PageWorker`] naming the page.
    pub async fn next(&mut self) -> Option<Result<PageResult<T>>> {
        let joined = self.tasks.join_next().await?;
        Some(match joined {
            Ok((_, Ok(result))) => Ok(result),
            Ok((page, Err(source))) => Err(Error::PageWorker {
                page,
                source: Box::new(source),
            }),
            Err(join_error) => Err(Error::TaskJoin(join_error)),
        })
    }

    /// Abort every outstanding task and refuse further permits
    pub fn cancel(&mut self) {
        if !self.tasks.is_empty() {
            debug!("cancelling {} outstanding page fetches", self.tasks.len());
        }
        self.permits.close();
        self.tasks.abort_all();
    }
}

impl<T> Drop for DeliveryQueue<T> {
    fn drop(&mut self) {
        // The JoinSet aborts its own tasks when dropped
        self.permits.close();
    }
}

#[cfg(test)]
mod queue_tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct SlowSource {
        started: AtomicUsize,
        finished: AtomicUsize,
    }

    #[async_trait]
    impl PageSource<u64> for SlowSource {
        async fn fetch(&self, request: &PageRequest) -> Result<PageResult<u64>> {
            self.started.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(PageResult {
                page: request.page,
                items: vec![request.page],
                page_count: None,
                item_count: None,
                status: 200,
            })
        }
    }

    #[tokio::test]
    async fn test_drop_aborts_pending_tasks() {
        let source = Arc::new(SlowSource::default());
        let template = PageRequest::new("/record/filter", 10);
        let mut queue = DeliveryQueue::<u64>::new(1);
        for page in 0..3 {
            queue.spawn(source.clone(), template.for_page(page, false));
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(source.started.load(Ordering::SeqCst), 1);

        drop(queue);
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(source.started.load(Ordering::SeqCst), 1);
        assert_eq!(source.finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_results_arrive_then_queue_drains() {
        let source = Arc::new(SlowSource::default());
        let template = PageRequest::new("/record/filter", 10);
        let mut queue = DeliveryQueue::<u64>::new(2);
        queue.spawn(source.clone(), template.for_page(0, false));
        queue.spawn(source.clone(), template.for_page(1, false));
        assert_eq!(queue.in_flight(), 2);

        let mut pages = Vec::new();
        while let Some(result) = queue.next().await {
            pages.push(result.unwrap().page);
        }
        pages.sort_unstable();
        assert_eq!(pages, vec![0, 1]);
        assert_eq!(queue.in_flight(), 0);
    }
}
