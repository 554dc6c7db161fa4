// Analyze pipeline: classify, persist, archive
//
// Archive writes are best effort: a failed upload downgrades `archived` to
// false and the request still succeeds. Classifier and store failures abort
// the request, so nothing is archived for a text that was never classified.

use std::sync::Arc;

use serde_json::Value;

use sentira_core::{
    NewRecord, RecordStore, Result, SentimentClassifier, SentimentError, SentimentRecord,
    TextArchive,
};

/// Largest accepted input, matching the classifier's per-document limit
pub const MAX_TEXT_CHARS: usize = 5000;

/// Outcome of one analyze call
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub record: SentimentRecord,
    pub archived: bool,
}

/// Runs one text through classification, persistence, and archival
#[derive(Clone)]
pub struct AnalysisService {
    classifier: Arc<dyn SentimentClassifier>,
    store: Arc<dyn RecordStore>,
    archive: Arc<dyn TextArchive>,
}

impl AnalysisService {
    pub fn new(
        classifier: Arc<dyn SentimentClassifier>,
        store: Arc<dyn RecordStore>,
        archive: Arc<dyn TextArchive>,
    ) -> Self {
        Self {
            classifier,
            store,
            archive,
        }
    }

    /// Classify `text`, persist the result, and optionally archive both the
    /// raw text and the classification
    pub async fn analyze(
        &self,
        text: &str,
        archive: bool,
        metadata: Option<&Value>,
    ) -> Result<AnalysisOutcome> {
        if text.trim().is_empty() {
            return Err(SentimentError::invalid_argument("text cannot be empty"));
        }
        if text.chars().count() > MAX_TEXT_CHARS {
            return Err(SentimentError::invalid_argument(format!(
                "text too long (max {MAX_TEXT_CHARS} characters)"
            )));
        }

        let classification = self.classifier.classify(text).await?;

        let record = self
            .store
            .insert(NewRecord::new(
                text,
                classification.sentiment,
                classification.confidence,
            )?)
            .await?;

        let mut archived = false;
        if archive {
            match self.archive.store_text(text, metadata).await {
                Ok(key) => {
                    tracing::debug!(%key, "raw text archived");
                    archived = true;
                    if let Err(e) = self.archive.store_result(text, &classification).await {
                        tracing::warn!("failed to archive classification result: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!("failed to archive raw text: {}", e);
                }
            }
        }

        tracing::info!(
            sentiment = %record.sentiment,
            confidence = record.confidence,
            archived,
            "analysis completed"
        );

        Ok(AnalysisOutcome { record, archived })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sentira_core::memory::{FixedClassifier, InMemoryArchive, InMemoryRecordStore};
    use sentira_core::{ArchiveObject, Classification, SentimentLabel};

    struct FailingArchive;

    #[async_trait]
    impl TextArchive for FailingArchive {
        async fn store_text(&self, _text: &str, _metadata: Option<&Value>) -> Result<String> {
            Err(SentimentError::archive("bucket is gone"))
        }

        async fn store_result(
            &self,
            _text: &str,
            _classification: &Classification,
        ) -> Result<String> {
            Err(SentimentError::archive("bucket is gone"))
        }

        async fn list(&self, _prefix: &str, _limit: usize) -> Result<Vec<ArchiveObject>> {
            Err(SentimentError::archive("bucket is gone"))
        }

        async fn ping(&self) -> Result<()> {
            Err(SentimentError::archive("bucket is gone"))
        }
    }

    struct FailingClassifier;

    #[async_trait]
    impl SentimentClassifier for FailingClassifier {
        async fn classify(&self, _text: &str) -> Result<Classification> {
            Err(SentimentError::classifier("endpoint unreachable"))
        }
    }

    fn positive(confidence: f64) -> Classification {
        Classification {
            sentiment: SentimentLabel::Positive,
            confidence,
        }
    }

    fn service_with(
        store: Arc<InMemoryRecordStore>,
        archive: Arc<dyn TextArchive>,
    ) -> AnalysisService {
        AnalysisService::new(Arc::new(FixedClassifier::new(positive(0.93))), store, archive)
    }

    #[tokio::test]
    async fn analyze_persists_and_archives() {
        let store = Arc::new(InMemoryRecordStore::new());
        let archive = Arc::new(InMemoryArchive::new());
        let service = service_with(store.clone(), archive.clone());

        let outcome = service
            .analyze("markets rallied on strong earnings", true, None)
            .await
            .unwrap();

        assert!(outcome.archived);
        assert_eq!(outcome.record.sentiment, SentimentLabel::Positive);
        assert_eq!(outcome.record.confidence, 0.93);
        assert_eq!(store.len().await, 1);

        let raw = archive.list("raw/text/", 10).await.unwrap();
        assert_eq!(raw.len(), 1);
        let stored = archive.get(&raw[0].key).await.unwrap();
        assert_eq!(stored, "markets rallied on strong earnings");

        let processed = archive.list("processed/sentiment/", 10).await.unwrap();
        assert_eq!(processed.len(), 1);
        let result: Value =
            serde_json::from_str(&archive.get(&processed[0].key).await.unwrap()).unwrap();
        assert_eq!(result["sentiment"], "POSITIVE");
        assert_eq!(result["confidence"], 0.93);
    }

    #[tokio::test]
    async fn analyze_skips_archive_when_disabled() {
        let store = Arc::new(InMemoryRecordStore::new());
        let archive = Arc::new(InMemoryArchive::new());
        let service = service_with(store.clone(), archive.clone());

        let outcome = service.analyze("quiet trading day", false, None).await.unwrap();

        assert!(!outcome.archived);
        assert_eq!(store.len().await, 1);
        assert!(archive.list("", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn analyze_survives_archive_failure() {
        let store = Arc::new(InMemoryRecordStore::new());
        let service = service_with(store.clone(), Arc::new(FailingArchive));

        let outcome = service
            .analyze("earnings missed expectations", true, None)
            .await
            .unwrap();

        // The record is persisted even though the upload failed
        assert!(!outcome.archived);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn analyze_fails_when_classifier_fails() {
        let store = Arc::new(InMemoryRecordStore::new());
        let archive = Arc::new(InMemoryArchive::new());
        let service = AnalysisService::new(
            Arc::new(FailingClassifier),
            store.clone(),
            archive.clone(),
        );

        let err = service.analyze("some text", true, None).await.unwrap_err();
        assert!(matches!(err, SentimentError::Classifier(_)));
        // Nothing was stored or archived
        assert_eq!(store.len().await, 0);
        assert!(archive.list("", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn analyze_rejects_blank_text() {
        let store = Arc::new(InMemoryRecordStore::new());
        let service = service_with(store.clone(), Arc::new(InMemoryArchive::new()));

        let err = service.analyze("   \n\t", true, None).await.unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn analyze_rejects_oversized_text() {
        let store = Arc::new(InMemoryRecordStore::new());
        let service = service_with(store.clone(), Arc::new(InMemoryArchive::new()));

        let text = "x".repeat(MAX_TEXT_CHARS + 1);
        let err = service.analyze(&text, true, None).await.unwrap_err();
        assert!(err.is_invalid_argument());

        // Exactly at the limit is accepted
        let text = "x".repeat(MAX_TEXT_CHARS);
        assert!(service.analyze(&text, false, None).await.is_ok());
    }
}
