// In-memory implementations for examples and testing
//
// These implementations keep all data in memory, making them perfect for:
// - Unit tests of the aggregation component
// - Router tests that need the full pipeline without Postgres or AWS
// - Quick prototyping

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{Result, SentimentError};
use crate::record::{Classification, NewRecord, RecordFilter, SentimentRecord};
use crate::traits::{ArchiveObject, RecordStore, SentimentClassifier, TextArchive};

// ============================================================================
// InMemoryRecordStore - stores sentiment records in memory
// ============================================================================

/// In-memory record store
///
/// Assigns ids monotonically and enforces the same insert invariants as the
/// database store (non-empty text, confidence in [0, 1]).
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<SentimentRecord>>>,
}

impl InMemoryRecordStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True when nothing has been stored
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drop all records
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<SentimentRecord> {
        if record.text.trim().is_empty() {
            return Err(SentimentError::invalid_argument("text cannot be empty"));
        }
        if !(0.0..=1.0).contains(&record.confidence) {
            return Err(SentimentError::invalid_argument(format!(
                "confidence {} outside [0, 1]",
                record.confidence
            )));
        }

        let now = Utc::now();
        let mut records = self.records.write().await;
        let stored = SentimentRecord {
            id: records.len() as i64 + 1,
            text: record.text,
            sentiment: record.sentiment,
            confidence: record.confidence,
            timestamp: record.timestamp.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };
        records.push(stored.clone());
        Ok(stored)
    }

    async fn query(&self, filter: &RecordFilter) -> Result<Vec<SentimentRecord>> {
        let mut matching: Vec<SentimentRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.timestamp);
        Ok(matching)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// FixedClassifier - returns a configured classification
// ============================================================================

/// Classifier stub that always returns the same classification
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    classification: Classification,
}

impl FixedClassifier {
    pub fn new(classification: Classification) -> Self {
        Self { classification }
    }
}

#[async_trait]
impl SentimentClassifier for FixedClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        if text.trim().is_empty() {
            return Err(SentimentError::invalid_argument("text cannot be empty"));
        }
        Ok(self.classification)
    }
}

// ============================================================================
// InMemoryArchive - key/value archive in memory
// ============================================================================

/// In-memory archive keyed by object key
#[derive(Debug, Default, Clone)]
pub struct InMemoryArchive {
    objects: Arc<RwLock<BTreeMap<String, (String, DateTime<Utc>)>>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored object body (useful in assertions)
    pub async fn get(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|(body, _)| body.clone())
    }

    async fn put(&self, prefix: &str, suffix: &str, body: String) -> Result<String> {
        let mut objects = self.objects.write().await;
        let key = format!("{prefix}{}{suffix}", objects.len() + 1);
        objects.insert(key.clone(), (body, Utc::now()));
        Ok(key)
    }
}

#[async_trait]
impl TextArchive for InMemoryArchive {
    async fn store_text(
        &self,
        text: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<String> {
        let body = match metadata {
            Some(meta) => format!("{text}\n{meta}"),
            None => text.to_string(),
        };
        self.put("raw/text/", ".txt", body).await
    }

    async fn store_result(&self, text: &str, classification: &Classification) -> Result<String> {
        let body = serde_json::json!({
            "text": text,
            "sentiment": classification.sentiment,
            "confidence": classification.confidence,
        })
        .to_string();
        self.put("processed/sentiment/", ".json", body).await
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ArchiveObject>> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .take(limit)
            .map(|(key, (body, modified))| ArchiveObject {
                key: key.clone(),
                size: body.len() as i64,
                last_modified: Some(*modified),
            })
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
