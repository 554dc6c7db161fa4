// Sentiment record aggregation
//
// Turns a collection of stored sentiment records into summary views without
// mutating the underlying store:
// - per-day label distributions with average confidence (`daily_summary`)
// - rolling per-day trend windows over the trailing N days (`trend`)
// - raw historical records over the trailing N days (`history`)
//
// Every operation is a single pass keyed by (UTC day, sentiment) after a
// range filter by timestamp. There is no caching and no incremental state:
// each call recomputes from the record range it requested, so concurrent
// calls need no coordination.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{Result, SentimentError};
use crate::label::SentimentLabel;
use crate::record::{RecordFilter, SentimentRecord};
use crate::traits::RecordStore;

/// Average confidence and record count for one label on one day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LabelSummary {
    /// Arithmetic mean of the confidences of the matching records
    pub average_confidence: f64,
    pub count: u64,
}

/// Record count for one label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LabelCount {
    pub sentiment: SentimentLabel,
    pub count: u64,
}

/// Per-day label counts inside a trend window.
/// Days with no records carry an empty `counts` vector; labels with no
/// records on a day are omitted from `counts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct DailyTrend {
    pub date: NaiveDate,
    pub counts: Vec<LabelCount>,
}

/// Stateless, read-only aggregation over a [`RecordStore`]
///
/// Day boundaries are UTC midnight-to-midnight: a record belongs to day `d`
/// iff `d <= timestamp < d + 1 day` in UTC. Store failures surface as
/// [`SentimentError::DataUnavailable`] annotated with the operation and its
/// parameters; they are never retried or absorbed here.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn RecordStore>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Average confidence and count per label for one UTC calendar date.
    ///
    /// Labels with zero matching records are omitted; a date with no records
    /// yields an empty map, not an error.
    pub async fn daily_summary(
        &self,
        date: NaiveDate,
    ) -> Result<BTreeMap<SentimentLabel, LabelSummary>> {
        let filter = RecordFilter::between(day_start(date), next_day_start(date)?);
        let records = self
            .store
            .query(&filter)
            .await
            .map_err(|e| SentimentError::unavailable(format!("daily_summary(date={date})"), e))?;

        let mut sums: BTreeMap<SentimentLabel, (f64, u64)> = BTreeMap::new();
        for record in &records {
            let entry = sums.entry(record.sentiment).or_insert((0.0, 0));
            entry.0 += record.confidence;
            entry.1 += 1;
        }

        let summary: BTreeMap<SentimentLabel, LabelSummary> = sums
            .into_iter()
            .map(|(sentiment, (sum, count))| {
                (
                    sentiment,
                    LabelSummary {
                        average_confidence: sum / count as f64,
                        count,
                    },
                )
            })
            .collect();
        tracing::debug!(%date, labels = summary.len(), "daily summary computed");
        Ok(summary)
    }

    /// Per-day label counts for the trailing `window_days` UTC calendar days,
    /// inclusive of today.
    ///
    /// Returns exactly `window_days` entries in ascending date order.
    /// `window_days <= 0` is a precondition failure raised before any store
    /// access.
    pub async fn trend(&self, window_days: i64) -> Result<Vec<DailyTrend>> {
        let window = TrailingWindow::ending_today(window_days, "window_days")?;
        let records = self
            .store
            .query(&window.filter())
            .await
            .map_err(|e| {
                SentimentError::unavailable(format!("trend(window_days={window_days})"), e)
            })?;

        let mut buckets: BTreeMap<(NaiveDate, SentimentLabel), u64> = BTreeMap::new();
        for record in &records {
            *buckets
                .entry((record.timestamp.date_naive(), record.sentiment))
                .or_insert(0) += 1;
        }

        let mut days = Vec::with_capacity(window_days as usize);
        let mut date = window.start;
        while date <= window.end {
            let counts = SentimentLabel::ALL
                .iter()
                .filter_map(|&sentiment| {
                    buckets
                        .get(&(date, sentiment))
                        .map(|&count| LabelCount { sentiment, count })
                })
                .collect();
            days.push(DailyTrend { date, counts });
            date = next_day(date)?;
        }
        tracing::debug!(window_days, records = records.len(), "trend window computed");
        Ok(days)
    }

    /// Raw records whose timestamps fall within the trailing `days` UTC
    /// calendar days, ordered by timestamp ascending.
    ///
    /// `days <= 0` is a precondition failure raised before any store access.
    pub async fn history(&self, days: i64) -> Result<Vec<SentimentRecord>> {
        let window = TrailingWindow::ending_today(days, "days")?;
        let records = self
            .store
            .query(&window.filter())
            .await
            .map_err(|e| SentimentError::unavailable(format!("history(days={days})"), e))?;
        tracing::debug!(days, records = records.len(), "history fetched");
        Ok(records)
    }
}

/// A span of whole UTC calendar days ending today
struct TrailingWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TrailingWindow {
    fn ending_today(days: i64, param: &str) -> Result<Self> {
        if days <= 0 {
            return Err(SentimentError::invalid_argument(format!(
                "{param} must be positive, got {days}"
            )));
        }
        let end = Utc::now().date_naive();
        let start = end
            .checked_sub_days(chrono::Days::new(days as u64 - 1))
            .ok_or_else(|| {
                SentimentError::invalid_argument(format!("{param}={days} is out of range"))
            })?;
        Ok(Self { start, end })
    }

    fn filter(&self) -> RecordFilter {
        // end is inclusive as a date, so the timestamp bound is the next midnight
        RecordFilter::between(
            day_start(self.start),
            day_start(self.end) + Duration::days(1),
        )
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn next_day(date: NaiveDate) -> Result<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| SentimentError::invalid_argument(format!("date {date} is out of range")))
}

fn next_day_start(date: NaiveDate) -> Result<DateTime<Utc>> {
    Ok(day_start(next_day(date)?))
}
