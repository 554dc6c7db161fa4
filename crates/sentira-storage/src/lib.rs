// Postgres storage layer with sqlx
//
// This crate provides database implementations for core traits:
// - DbRecordStore: implements RecordStore for sentiment record persistence
//
// The schema lives in ./migrations and is embedded at compile time via
// sqlx::migrate!, applied by Database::migrate at startup.

pub mod models;
pub mod record_store;
pub mod repositories;

pub use models::{CreateSentimentRow, SentimentRow};
pub use record_store::DbRecordStore;
pub use repositories::Database;
