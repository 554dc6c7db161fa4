// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use sentira_core::{SentimentError, SentimentLabel, SentimentRecord};

#[derive(Debug, Clone, FromRow)]
pub struct SentimentRow {
    pub id: i64,
    pub text: String,
    pub sentiment: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSentimentRow {
    pub text: String,
    pub sentiment: String,
    pub confidence: f64,
    /// None lets the database stamp NOW()
    pub timestamp: Option<DateTime<Utc>>,
}

impl TryFrom<SentimentRow> for SentimentRecord {
    type Error = SentimentError;

    /// The sentiment column is constrained by a CHECK, so an unknown label
    /// means the schema and the code disagree about the closed label set.
    fn try_from(row: SentimentRow) -> Result<Self, Self::Error> {
        let sentiment = row.sentiment.parse::<SentimentLabel>().map_err(|_| {
            SentimentError::Internal(anyhow::anyhow!(
                "record {} has unknown sentiment label {:?}",
                row.id,
                row.sentiment
            ))
        })?;
        Ok(SentimentRecord {
            id: row.id,
            text: row.text,
            sentiment,
            confidence: row.confidence,
            timestamp: row.timestamp,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(sentiment: &str) -> SentimentRow {
        let now = Utc::now();
        SentimentRow {
            id: 7,
            text: "great launch".to_string(),
            sentiment: sentiment.to_string(),
            confidence: 0.93,
            timestamp: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_converts_to_record() {
        let record = SentimentRecord::try_from(row("POSITIVE")).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.sentiment, SentimentLabel::Positive);
        assert_eq!(record.confidence, 0.93);
    }

    #[test]
    fn row_with_unknown_label_is_an_internal_error() {
        let err = SentimentRecord::try_from(row("ECSTATIC")).unwrap_err();
        assert!(matches!(err, SentimentError::Internal(_)));
        assert!(err.to_string().contains("ECSTATIC"));
    }
}
