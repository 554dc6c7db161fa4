// S3 text archive
//
// Implements TextArchive against the S3 REST API: PutObject for raw text
// and processed results, ListObjectsV2 for browsing, HeadBucket as the
// health probe. Buckets are addressed by subdomain against real AWS and
// path-style against overridden endpoints, where bucket subdomains don't
// resolve.

use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use uuid::Uuid;

use sentira_core::{ArchiveObject, Classification, Result, SentimentError, TextArchive};

use crate::config::{host_header, AwsConfig};
use crate::sigv4::{sha256_hex, uri_encode, Signer};

const SERVICE: &str = "s3";

/// Keys for raw submitted text
const RAW_TEXT_PREFIX: &str = "raw/text/";
/// Keys for classification results
const PROCESSED_PREFIX: &str = "processed/sentiment/";

#[derive(Clone)]
pub struct S3Archive {
    client: Client,
    signer: Signer,
    /// Scheme, host and optional port, no trailing slash
    base_url: String,
    host: String,
    /// "/{bucket}" under path-style addressing, empty otherwise
    key_prefix: String,
    bucket: String,
}

impl S3Archive {
    pub fn new(config: &AwsConfig, bucket: impl Into<String>) -> anyhow::Result<Self> {
        let bucket = bucket.into();
        let path_style = config.force_path_style || config.endpoint.is_some();

        let (base_url, key_prefix) = match (&config.endpoint, path_style) {
            (Some(endpoint), _) => (
                endpoint.trim_end_matches('/').to_string(),
                format!("/{bucket}"),
            ),
            (None, true) => (
                format!("https://s3.{}.amazonaws.com", config.region),
                format!("/{bucket}"),
            ),
            (None, false) => (
                format!("https://{bucket}.s3.{}.amazonaws.com", config.region),
                String::new(),
            ),
        };
        let host = host_header(&base_url)?;

        Ok(Self {
            client: Client::new(),
            signer: Signer::new(config.credentials(), &config.region, SERVICE),
            base_url,
            host,
            key_prefix,
            bucket,
        })
    }

    /// Bucket root, the target for list and probe calls
    fn bucket_path(&self) -> String {
        if self.key_prefix.is_empty() {
            "/".to_string()
        } else {
            self.key_prefix.clone()
        }
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        metadata: &[(String, String)],
    ) -> Result<()> {
        let path = format!("{}/{}", self.key_prefix, uri_encode(key, false));
        let payload_hash = sha256_hex(&body);

        let mut headers: Vec<(String, String)> = vec![
            ("content-type".to_string(), content_type.to_string()),
            ("x-amz-content-sha256".to_string(), payload_hash.clone()),
        ];
        for (name, value) in metadata {
            headers.push((format!("x-amz-meta-{name}"), value.clone()));
        }

        let header_refs: Vec<(&str, &str)> = headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let signed = self.signer.sign(
            "PUT",
            &self.host,
            &path,
            "",
            &header_refs,
            &payload_hash,
            Utc::now(),
        );

        let mut request = self.client.put(format!("{}{path}", self.base_url));
        for (name, value) in headers.iter().chain(signed.iter()) {
            request = request.header(name, value);
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| SentimentError::archive(format!("failed to send request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SentimentError::archive(format!(
                "S3 PutObject error ({status}): {error_text}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TextArchive for S3Archive {
    async fn store_text(&self, text: &str, metadata: Option<&serde_json::Value>) -> Result<String> {
        let key = format!("{RAW_TEXT_PREFIX}{}.txt", Uuid::now_v7());

        let mut meta: Vec<(String, String)> = vec![
            ("timestamp".to_string(), Utc::now().to_rfc3339()),
            ("source".to_string(), "sentira".to_string()),
        ];
        if let Some(serde_json::Value::Object(map)) = metadata {
            for (name, value) in map {
                meta.push((name.clone(), metadata_value(value)));
            }
        }

        self.put_object(&key, text.as_bytes().to_vec(), "text/plain", &meta)
            .await?;
        tracing::info!(%key, "archived raw text");
        Ok(key)
    }

    async fn store_result(&self, text: &str, classification: &Classification) -> Result<String> {
        let key = format!("{PROCESSED_PREFIX}{}.json", Uuid::now_v7());
        let timestamp = Utc::now();

        let body = serde_json::to_vec_pretty(&serde_json::json!({
            "timestamp": timestamp.to_rfc3339(),
            "text": text,
            "sentiment": classification.sentiment,
            "confidence": classification.confidence,
        }))
        .map_err(|e| SentimentError::archive(format!("failed to encode result: {e}")))?;

        let meta = vec![
            ("timestamp".to_string(), timestamp.to_rfc3339()),
            (
                "sentiment".to_string(),
                classification.sentiment.to_string(),
            ),
            (
                "confidence".to_string(),
                classification.confidence.to_string(),
            ),
        ];

        self.put_object(&key, body, "application/json", &meta)
            .await?;
        tracing::info!(%key, "archived classification result");
        Ok(key)
    }

    async fn list(&self, prefix: &str, limit: usize) -> Result<Vec<ArchiveObject>> {
        // canonical form requires the parameters in name order
        let query = format!(
            "list-type=2&max-keys={limit}&prefix={}",
            uri_encode(prefix, true)
        );
        let path = self.bucket_path();
        let payload_hash = sha256_hex(b"");

        let signed = self.signer.sign(
            "GET",
            &self.host,
            &path,
            &query,
            &[("x-amz-content-sha256", &payload_hash)],
            &payload_hash,
            Utc::now(),
        );

        let mut request = self
            .client
            .get(format!("{}{path}?{query}", self.base_url))
            .header("x-amz-content-sha256", &payload_hash);
        for (name, value) in signed {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SentimentError::archive(format!("failed to send request: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SentimentError::archive(format!(
                "S3 ListObjectsV2 error ({status}): {error_text}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SentimentError::archive(format!("failed to read response: {e}")))?;
        Ok(parse_list_response(&body))
    }

    async fn ping(&self) -> Result<()> {
        let path = self.bucket_path();
        let payload_hash = sha256_hex(b"");

        let signed = self.signer.sign(
            "HEAD",
            &self.host,
            &path,
            "",
            &[("x-amz-content-sha256", &payload_hash)],
            &payload_hash,
            Utc::now(),
        );

        let mut request = self
            .client
            .head(format!("{}{path}", self.base_url))
            .header("x-amz-content-sha256", &payload_hash);
        for (name, value) in signed {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SentimentError::archive(format!("failed to send request: {e}")))?;

        if !response.status().is_success() {
            return Err(SentimentError::archive(format!(
                "S3 HeadBucket error ({}) for bucket {:?}",
                response.status(),
                self.bucket
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for S3Archive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Archive")
            .field("bucket", &self.bucket)
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn metadata_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// ListObjectsV2 response scraping
// ============================================================================
//
// The response grammar is flat: Contents elements carry no attributes and
// never nest, so a few regexes beat carrying an XML dependency.

fn contents_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<Contents>(.*?)</Contents>").expect("hardcoded regex"))
}

fn key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<Key>([^<]*)</Key>").expect("hardcoded regex"))
}

fn size_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<Size>(\d+)</Size>").expect("hardcoded regex"))
}

fn last_modified_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<LastModified>([^<]*)</LastModified>").expect("hardcoded regex")
    })
}

fn parse_list_response(xml: &str) -> Vec<ArchiveObject> {
    contents_re()
        .captures_iter(xml)
        .filter_map(|contents| {
            let block = contents.get(1)?.as_str();
            let key = xml_unescape(key_re().captures(block)?.get(1)?.as_str());
            let size = size_re()
                .captures(block)
                .and_then(|c| c.get(1)?.as_str().parse::<i64>().ok())
                .unwrap_or(0);
            let last_modified = last_modified_re()
                .captures(block)
                .and_then(|c| DateTime::parse_from_rfc3339(c.get(1)?.as_str()).ok())
                .map(|dt| dt.with_timezone(&Utc));
            Some(ArchiveObject {
                key,
                size,
                last_modified,
            })
        })
        .collect()
}

/// Reverse the five XML character escapes S3 applies to keys
fn xml_unescape(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
