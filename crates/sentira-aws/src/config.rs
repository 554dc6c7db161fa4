// Environment-driven AWS configuration
//
// One config struct feeds every client in this crate. An endpoint override
// redirects the clients to a local stack; overridden S3 endpoints are
// addressed path-style since bucket subdomains don't resolve there.

use anyhow::{anyhow, Context, Result};

use crate::sigv4::Credentials;

#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
    /// Base URL (scheme, host, optional port, no path) replacing the
    /// per-service AWS endpoints
    pub endpoint: Option<String>,
    /// Address S3 objects as /bucket/key instead of bucket subdomains
    pub force_path_style: bool,
}

impl AwsConfig {
    pub fn new(
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            endpoint: None,
            force_path_style: false,
        }
    }

    /// Read the standard AWS environment variables.
    ///
    /// AWS_REGION defaults to us-east-1, credentials are required.
    /// AWS_SESSION_TOKEN, AWS_ENDPOINT_URL and AWS_S3_FORCE_PATH_STYLE
    /// are optional.
    pub fn from_env() -> Result<Self> {
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID")
            .context("AWS_ACCESS_KEY_ID environment variable is not set")?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .context("AWS_SECRET_ACCESS_KEY environment variable is not set")?;
        let session_token = std::env::var("AWS_SESSION_TOKEN").ok();
        let endpoint = std::env::var("AWS_ENDPOINT_URL").ok();
        let force_path_style = std::env::var("AWS_S3_FORCE_PATH_STYLE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            region,
            access_key_id,
            secret_access_key,
            session_token,
            endpoint,
            force_path_style,
        })
    }

    /// Point every client at a custom base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_path_style(mut self) -> Self {
        self.force_path_style = true;
        self
    }

    pub(crate) fn credentials(&self) -> Credentials {
        Credentials {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
        }
    }
}

/// Host header value for an endpoint, keeping any non-default port
pub(crate) fn host_header(endpoint: &str) -> Result<String> {
    let url = reqwest::Url::parse(endpoint)
        .map_err(|e| anyhow!("invalid endpoint {endpoint:?}: {e}"))?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("endpoint {endpoint:?} has no host"))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
