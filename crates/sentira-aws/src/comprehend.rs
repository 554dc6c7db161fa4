// Amazon Comprehend sentiment classifier
//
// Implements SentimentClassifier over the Comprehend JSON 1.1 protocol.
// DetectSentiment returns one dominant label plus a score per label; the
// classification confidence is the largest of the four scores.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use sentira_core::{Classification, Result, SentimentClassifier, SentimentError, SentimentLabel};

use crate::config::{host_header, AwsConfig};
use crate::sigv4::{sha256_hex, Signer};

const SERVICE: &str = "comprehend";
const TARGET: &str = "Comprehend_20171127.DetectSentiment";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// DetectSentiment rejects documents above this UTF-8 size
const MAX_TEXT_BYTES: usize = 5000;

#[derive(Clone)]
pub struct ComprehendClassifier {
    client: Client,
    signer: Signer,
    endpoint: String,
    host: String,
    language_code: String,
}

impl ComprehendClassifier {
    pub fn new(config: &AwsConfig) -> anyhow::Result<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://comprehend.{}.amazonaws.com", config.region));
        let host = host_header(&endpoint)?;

        Ok(Self {
            client: Client::new(),
            signer: Signer::new(config.credentials(), &config.region, SERVICE),
            endpoint,
            host,
            language_code: "en".to_string(),
        })
    }

    pub fn with_language_code(mut self, language_code: impl Into<String>) -> Self {
        self.language_code = language_code.into();
        self
    }
}

#[async_trait]
impl SentimentClassifier for ComprehendClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        if text.trim().is_empty() {
            return Err(SentimentError::invalid_argument("text cannot be empty"));
        }
        if text.len() > MAX_TEXT_BYTES {
            return Err(SentimentError::invalid_argument(format!(
                "text is {} bytes, DetectSentiment accepts at most {MAX_TEXT_BYTES}",
                text.len()
            )));
        }

        let body = serde_json::to_vec(&DetectSentimentRequest {
            text,
            language_code: &self.language_code,
        })
        .map_err(|e| SentimentError::classifier(format!("failed to encode request: {e}")))?;

        let payload_hash = sha256_hex(&body);
        let signed_headers = self.signer.sign(
            "POST",
            &self.host,
            "/",
            "",
            &[("content-type", CONTENT_TYPE), ("x-amz-target", TARGET)],
            &payload_hash,
            Utc::now(),
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-target", TARGET);
        for (name, value) in signed_headers {
            request = request.header(name, value);
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| SentimentError::classifier(format!("failed to send request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SentimentError::classifier(format!(
                "Comprehend API error ({status}): {error_text}"
            )));
        }

        let detected: DetectSentimentResponse = response
            .json()
            .await
            .map_err(|e| SentimentError::classifier(format!("failed to parse response: {e}")))?;

        let classification = detected.into_classification()?;
        tracing::debug!(
            sentiment = %classification.sentiment,
            confidence = classification.confidence,
            "detected sentiment"
        );
        Ok(classification)
    }
}

impl std::fmt::Debug for ComprehendClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComprehendClassifier")
            .field("endpoint", &self.endpoint)
            .field("language_code", &self.language_code)
            .finish()
    }
}

// ============================================================================
// Comprehend API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectSentimentRequest<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectSentimentResponse {
    sentiment: String,
    sentiment_score: SentimentScore,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SentimentScore {
    #[serde(default)]
    mixed: f64,
    #[serde(default)]
    negative: f64,
    #[serde(default)]
    neutral: f64,
    #[serde(default)]
    positive: f64,
}

impl DetectSentimentResponse {
    fn into_classification(self) -> Result<Classification> {
        let sentiment = self.sentiment.parse::<SentimentLabel>().map_err(|_| {
            SentimentError::classifier(format!("unknown sentiment label {:?}", self.sentiment))
        })?;
        Ok(Classification {
            sentiment,
            confidence: self.sentiment_score.max(),
        })
    }
}

impl SentimentScore {
    fn max(&self) -> f64 {
        [self.mixed, self.negative, self.neutral, self.positive]
            .into_iter()
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    /// Matches requests carrying a SigV4 authorization header
    struct SignedWithSigV4;

    impl Match for SignedWithSigV4 {
        fn matches(&self, request: &Request) -> bool {
            request
                .headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value.starts_with("AWS4-HMAC-SHA256 Credential="))
        }
    }

    fn test_config(endpoint: &str) -> AwsConfig {
        AwsConfig::new("us-east-1", "AKIDEXAMPLE", "secret").with_endpoint(endpoint)
    }

    #[tokio::test]
    async fn classifies_text_with_the_dominant_score() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-amz-target", TARGET))
            .and(header("content-type", CONTENT_TYPE))
            .and(body_json(
                json!({"Text": "great quarter", "LanguageCode": "en"}),
            ))
            .and(SignedWithSigV4)
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Sentiment": "POSITIVE",
                "SentimentScore": {
                    "Mixed": 0.01,
                    "Negative": 0.02,
                    "Neutral": 0.05,
                    "Positive": 0.92
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let classifier = ComprehendClassifier::new(&test_config(&server.uri())).unwrap();
        let result = classifier.classify("great quarter").await.unwrap();

        assert_eq!(result.sentiment, SentimentLabel::Positive);
        assert!((result.confidence - 0.92).abs() < 1e-9);
    }

    #[tokio::test]
    async fn api_errors_surface_as_classifier_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"__type":"TextSizeLimitExceededException"}"#),
            )
            .mount(&server)
            .await;

        let classifier = ComprehendClassifier::new(&test_config(&server.uri())).unwrap();
        let err = classifier.classify("some text").await.unwrap_err();

        assert!(matches!(err, SentimentError::Classifier(_)));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("TextSizeLimitExceededException"));
    }

    #[tokio::test]
    async fn unknown_labels_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Sentiment": "ECSTATIC",
                "SentimentScore": {"Positive": 0.99}
            })))
            .mount(&server)
            .await;

        let classifier = ComprehendClassifier::new(&test_config(&server.uri())).unwrap();
        let err = classifier.classify("some text").await.unwrap_err();

        assert!(matches!(err, SentimentError::Classifier(_)));
        assert!(err.to_string().contains("ECSTATIC"));
    }

    #[tokio::test]
    async fn blank_text_never_reaches_the_network() {
        // port 1 is never listening; a request attempt would error differently
        let config = test_config("http://127.0.0.1:1");
        let classifier = ComprehendClassifier::new(&config).unwrap();

        let err = classifier.classify("   ").await.unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn oversized_text_never_reaches_the_network() {
        let config = test_config("http://127.0.0.1:1");
        let classifier = ComprehendClassifier::new(&config).unwrap();

        let err = classifier.classify(&"a".repeat(5001)).await.unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("5001"));
    }
}
