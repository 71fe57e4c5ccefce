//! Retrieval engine
//!
//! Every strategy runs through the same fan-out/drain loop; strategies only
//! differ in how the loop learns where to stop and how many fetches it keeps
//! ahead of the consumer.
//!
//! | Strategy   | Schedule     | Fetches at once  | Spawn window     | Order            |
//! |------------|--------------|------------------|------------------|------------------|
//! | `Fast`     | until empty  | 1                | 1                | page index       |
//! | `Default`  | counted      | 1                | 1                | page index       |
//! | `Parallel` | counted      | `max_concurrency`| all pages        | completion       |
//!
//! Counted schedules fetch page 0 with `count=true` first; its batch is
//! always delivered first. Empty pages are never yielded. The first failure
//! cancels every outstanding fetch before the error reaches the consumer,
//! and dropping the stream cancels them as well.

use super::queue::DeliveryQueue;
use super::types::{BatchStream, PageRequest, PageResult, PageSource};
use crate::config::PaginationOptions;
use crate::error::{Error, Result};
use crate::types::{JsonValue, PaginationStrategy};
use async_stream::try_stream;
use std::sync::Arc;
use tracing::debug;

/// How the drain loop decides it has seen every page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Schedule {
    /// Page 0 reports the page count; fetch exactly that many pages
    Counted,
    /// Fetch pages until one comes back empty
    UntilEmpty,
}

/// State of one `get_all` call.
///
/// Each session owns its own concurrency budget; nothing is shared between
/// sessions except what the page source itself shares.
pub struct RetrievalSession<T> {
    source: Arc<dyn PageSource<T>>,
    template: PageRequest,
    options: PaginationOptions,
}

impl<T: Send + 'static> RetrievalSession<T> {
    /// Create a session, rejecting unusable options
    pub fn new(
        source: Arc<dyn PageSource<T>>,
        upstream: impl Into<Arc<str>>,
        options: PaginationOptions,
        query: Option<JsonValue>,
    ) -> Result<Self> {
        options.validate()?;
        let template = PageRequest::new(upstream, options.page_size)
            .method(options.method)
            .body(query.map(Arc::new));
        Ok(Self {
            source,
            template,
            options,
        })
    }

    /// The options this session runs with
    pub fn options(&self) -> &PaginationOptions {
        &self.options
    }

    pub(crate) fn schedule(&self) -> Schedule {
        match self.options.strategy {
            PaginationStrategy::Fast => Schedule::UntilEmpty,
            PaginationStrategy::Default | PaginationStrategy::Parallel => Schedule::Counted,
        }
    }

    /// Fetches allowed to execute at once
    pub(crate) fn concurrency(&self) -> usize {
        match self.options.strategy {
            PaginationStrategy::Parallel => self.options.max_concurrency,
            PaginationStrategy::Default | PaginationStrategy::Fast => 1,
        }
    }

    /// Tasks allowed to be spawned but not yet pulled
    fn spawn_window(&self) -> usize {
        match self.options.strategy {
            PaginationStrategy::Parallel => usize::MAX,
            PaginationStrategy::Default | PaginationStrategy::Fast => 1,
        }
    }

    /// Run the session as a lazy stream of item batches
    pub fn into_stream(self) -> BatchStream<T> {
        let schedule = self.schedule();
        let window = self.spawn_window();
        let mut queue = DeliveryQueue::new(self.concurrency());
        let Self {
            source, template, ..
        } = self;

        Box::pin(try_stream! {
            let mut next_page: u64 = 0;
            // Exclusive upper bound on page indexes, once known
            let mut end: Option<u64> = None;
            let mut exhausted = false;

            if schedule == Schedule::Counted {
                queue.spawn(Arc::clone(&source), template.for_page(0, true));
                next_page = 1;
                end = Some(1);

                if let Some(first) = pull(&mut queue).await? {
                    let pages = first.page_count.ok_or_else(|| {
                        Error::protocol(format!(
                            "{}: counted first page did not report a page count",
                            template.upstream
                        ))
                    })?;
                    debug!(
                        "{}: {} pages, {} items",
                        template.upstream,
                        pages,
                        first.item_count.unwrap_or(0)
                    );
                    end = Some(pages.max(1));
                    if !first.is_empty() {
                        yield first.items;
                    }
                }
            }

            loop {
                while !exhausted
                    && queue.in_flight() < window
                    && end.map_or(true, |end| next_page < end)
                {
                    queue.spawn(Arc::clone(&source), template.for_page(next_page, false));
                    next_page += 1;
                }

                let Some(page) = pull(&mut queue).await? else {
                    break;
                };
                if page.is_empty() {
                    if schedule == Schedule::UntilEmpty {
                        exhausted = true;
                    }
                    continue;
                }
                yield page.items;
            }

            debug!("{}: retrieval complete, {} pages requested", template.upstream, next_page);
        })
    }
}

/// Pull the next result, cancelling the queue before surfacing a failure
async fn pull<T: Send + 'static>(queue: &mut DeliveryQueue<T>) -> Result<Option<PageResult<T>>> {
    match queue.next().await {
        None => Ok(None),
        Some(Ok(page)) => Ok(Some(page)),
        Some(Err(e)) => {
            queue.cancel();
            Err(e)
        }
    }
}
