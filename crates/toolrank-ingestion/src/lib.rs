//! toolrank-ingestion: Popularity signal fetching.
//!
//! Sources produce monthly `Table`s of raw signal values; the collector
//! batches requests, caches results and turns per-batch or per-tool failures
//! into warnings so a refresh always completes.

pub mod cache;
pub mod collector;
pub mod http;
pub mod sources;

pub use cache::{CacheKey, FetchCache};
pub use collector::{SignalCollector, BATCH_SIZE};
pub use http::{FetchClient, HttpSettings};
pub use sources::{
    BoundedSignalSource, Fetched, MockPageviewsSource, MockTrendsSource, PageviewsClient,
    TrendsExportSource, UnboundedSignalSource,
};
