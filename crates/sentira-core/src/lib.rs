// Sentiment Record Aggregation
//
// This crate provides a DB-agnostic implementation of the sentiment-record
// aggregation component: daily label summaries, rolling trend windows, and
// historical queries over a store of classification results.
//
// Key design decisions:
// - Uses traits (RecordStore, SentimentClassifier, TextArchive) for pluggable backends
// - The aggregator is stateless and read-only; every call recomputes from the store
// - Day bucketing is UTC midnight-to-midnight
// - SentimentLabel is a closed enum; invalid labels never reach aggregation logic
// - Error handling distinguishes invalid arguments (fail fast, no I/O) from
//   unavailable data (store failures, annotated and propagated unchanged)

pub mod aggregate;
pub mod error;
pub mod label;
pub mod record;
pub mod traits;

// In-memory implementations for examples and testing
pub mod memory;

// Re-exports for convenience
pub use aggregate::{Aggregator, DailyTrend, LabelCount, LabelSummary};
pub use error::{Result, SentimentError};
pub use label::SentimentLabel;
pub use record::{Classification, NewRecord, RecordFilter, SentimentRecord};
pub use traits::{ArchiveObject, RecordStore, SentimentClassifier, TextArchive};
