// Repository layer for database operations

use anyhow::Result;
use sqlx::PgPool;

use crate::models::{CreateSentimentRow, SentimentRow};

const RECORD_COLUMNS: &str = "id, text, sentiment, confidence, timestamp, created_at, updated_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    pub async fn insert_record(&self, input: CreateSentimentRow) -> Result<SentimentRow> {
        let row = sqlx::query_as::<_, SentimentRow>(&format!(
            r#"
            INSERT INTO sentiment_records (text, sentiment, confidence, timestamp)
            VALUES ($1, $2, $3, COALESCE($4, NOW()))
            RETURNING {RECORD_COLUMNS}
            "#,
        ))
        .bind(&input.text)
        .bind(&input.sentiment)
        .bind(input.confidence)
        .bind(input.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Fetch records matching an optional time range and label.
    ///
    /// `from` is inclusive, `until` exclusive. Rows come back in timestamp
    /// order with id as the tie-break so repeated reads are stable.
    pub async fn query_records(
        &self,
        from: Option<chrono::DateTime<chrono::Utc>>,
        until: Option<chrono::DateTime<chrono::Utc>>,
        sentiment: Option<&str>,
    ) -> Result<Vec<SentimentRow>> {
        let rows = sqlx::query_as::<_, SentimentRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM sentiment_records
            WHERE ($1::timestamptz IS NULL OR timestamp >= $1)
              AND ($2::timestamptz IS NULL OR timestamp < $2)
              AND ($3::text IS NULL OR sentiment = $3)
            ORDER BY timestamp ASC, id ASC
            "#,
        ))
        .bind(from)
        .bind(until)
        .bind(sentiment)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Round-trip a trivial query to verify the connection is alive
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
