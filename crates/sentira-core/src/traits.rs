// Core traits for pluggable backends
//
// These traits keep the aggregation component and the write path independent
// of concrete infrastructure:
// - In-memory implementations for examples and testing (see `memory`)
// - PostgreSQL / AWS implementations for production (sentira-storage, sentira-aws)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::Result;
use crate::record::{Classification, NewRecord, RecordFilter, SentimentRecord};

// ============================================================================
// RecordStore - persistence for classification results
// ============================================================================

/// Trait for storing and querying sentiment records
///
/// Implementations must preserve the record invariants on insert (non-empty
/// text, confidence in [0, 1]) and return query results ordered by timestamp
/// ascending.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a record, assigning its id and bookkeeping timestamps
    async fn insert(&self, record: NewRecord) -> Result<SentimentRecord>;

    /// Fetch records matching the filter, ordered by timestamp ascending
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<SentimentRecord>>;

    /// Cheap availability probe
    async fn ping(&self) -> Result<()>;
}

// ============================================================================
// SentimentClassifier - the managed classification service
// ============================================================================

/// Trait for the managed sentiment classifier
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify a non-empty text into a label and a confidence in [0, 1]
    async fn classify(&self, text: &str) -> Result<Classification>;
}

// ============================================================================
// TextArchive - durable raw-text/object storage
// ============================================================================

/// Object listed from the archive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ArchiveObject {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Trait for archiving raw inputs and classification results durably
#[async_trait]
pub trait TextArchive: Send + Sync {
    /// Store raw input text with optional caller metadata; returns the object key
    async fn store_text(&self, text: &str, metadata: Option<&serde_json::Value>)
        -> Result<String>;

    /// Store the classification result alongside the text it was produced
    /// from; returns the object key
    async fn store_result(&self, text: &str, classification: &Classification) -> Result<String>;

    /// List archived objects under a prefix
    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ArchiveObject>>;

    /// Cheap availability probe
    async fn ping(&self) -> Result<()>;
}
