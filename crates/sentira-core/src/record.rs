// Sentiment record domain types
//
// Records are immutable once written: the store assigns the id and the
// bookkeeping timestamps, and nothing in this crate mutates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{Result, SentimentError};
use crate::label::SentimentLabel;

/// One persisted classification result tied to an input text and timestamp
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SentimentRecord {
    /// Surrogate key assigned by the store on insert
    pub id: i64,
    /// Original input text, non-empty
    pub text: String,
    pub sentiment: SentimentLabel,
    /// Classifier certainty in [0, 1]
    pub confidence: f64,
    /// When the classification was produced (not insertion order; backfills
    /// with out-of-order timestamps are legal)
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Classification result returned by the managed classifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Classification {
    pub sentiment: SentimentLabel,
    pub confidence: f64,
}

/// Insert payload for a sentiment record
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    /// Defaults to write time when not supplied
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewRecord {
    /// Build an insert payload, failing fast on invariant violations
    pub fn new(
        text: impl Into<String>,
        sentiment: SentimentLabel,
        confidence: f64,
    ) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SentimentError::invalid_argument("text cannot be empty"));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(SentimentError::invalid_argument(format!(
                "confidence {confidence} outside [0, 1]"
            )));
        }
        Ok(Self {
            text,
            sentiment,
            confidence,
            timestamp: None,
        })
    }

    /// Pin the classification timestamp instead of defaulting to write time
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Range/label filter for record queries.
/// `from` is inclusive, `until` exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub sentiment: Option<SentimentLabel>,
}

impl RecordFilter {
    /// Filter to `[from, until)`
    pub fn between(from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            until: Some(until),
            sentiment: None,
        }
    }

    /// Restrict to a single label
    pub fn with_sentiment(mut self, sentiment: SentimentLabel) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    /// True when `timestamp` falls inside the filter range and the label matches
    pub fn matches(&self, record: &SentimentRecord) -> bool {
        if let Some(from) = self.from {
            if record.timestamp < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.timestamp >= until {
                return false;
            }
        }
        if let Some(sentiment) = self.sentiment {
            if record.sentiment != sentiment {
                return false;
            }
        }
        true
    }
}
