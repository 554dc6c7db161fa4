// Database-backed RecordStore implementation
//
// Implements the core RecordStore trait on top of the repository layer.
// Conversion between core types and rows happens here; repositories deal
// in rows only. Pool-level failures map to DataUnavailable so callers can
// distinguish a down database from bad input.

use async_trait::async_trait;
use sentira_core::{NewRecord, RecordFilter, RecordStore, Result, SentimentError, SentimentRecord};

use crate::models::CreateSentimentRow;
use crate::repositories::Database;

/// Database-backed sentiment record store
#[derive(Clone)]
pub struct DbRecordStore {
    db: Database,
}

impl DbRecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for DbRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<SentimentRecord> {
        let input = CreateSentimentRow {
            text: record.text,
            sentiment: record.sentiment.as_str().to_string(),
            confidence: record.confidence,
            timestamp: record.timestamp,
        };

        let row = self
            .db
            .insert_record(input)
            .await
            .map_err(|e| SentimentError::unavailable("insert", e))?;

        row.try_into()
    }

    async fn query(&self, filter: &RecordFilter) -> Result<Vec<SentimentRecord>> {
        let rows = self
            .db
            .query_records(
                filter.from,
                filter.until,
                filter.sentiment.map(|s| s.as_str()),
            )
            .await
            .map_err(|e| SentimentError::unavailable("query", e))?;

        rows.into_iter().map(SentimentRecord::try_from).collect()
    }

    async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| SentimentError::unavailable("ping", e))
    }
}
