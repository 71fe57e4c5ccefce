//! Pagination module
//!
//! Retrieves every page of a repository resource.
//!
//! # Strategies
//!
//! - **Fast**: walk pages one at a time until an empty page comes back; no
//!   counting, strictly in page order
//! - **Default**: count on page 0, then fetch the remaining pages in order
//! - **Parallel**: count on page 0, then fetch the remaining pages with up to
//!   `max_concurrency` requests in flight, delivered in completion order
//!
//! All three run through one engine, see [`RetrievalSession`].

mod decode;
mod engine;
mod fetcher;
mod queue;
mod retrieval;
mod types;

pub use decode::{decode_page, DecodePool};
pub use engine::RetrievalSession;
pub use fetcher::{fetch_counts, PageFetcher};
pub use retrieval::{get_all, get_all_with_pool, get_count, into_items};
pub use types::{
    BatchStream, PageRequest, PageResult, PageSource, ITEM_COUNT_HEADER, PAGE_COUNT_HEADER,
};
