//! Outbound siteverify transport.

use async_trait::async_trait;
use axum::body::Bytes;
use hcaptcha_common::{ConfigError, SiteVerifyRequest, VerifyError};
use std::time::Duration;

/// Minimal capability needed to reach the siteverify endpoint: submit a form,
/// receive the raw reply body.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait SiteVerifyClient: Send + Sync {
    async fn post_form(&self, url: &str, form: &SiteVerifyRequest) -> Result<Bytes, VerifyError>;
}

/// Pooled reqwest client with a fixed timeout
#[derive(Debug, Clone)]
pub struct ReqwestSiteVerifyClient {
    http: reqwest::Client,
}

impl ReqwestSiteVerifyClient {
    /// Build a client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hcaptcha-guard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { http })
    }

    /// Wrap an existing client (shares its connection pool)
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl SiteVerifyClient for ReqwestSiteVerifyClient {
    async fn post_form(&self, url: &str, form: &SiteVerifyRequest) -> Result<Bytes, VerifyError> {
        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;

        tracing::trace!(status = %response.status(), "siteverify replied");

        response
            .bytes()
            .await
            .map_err(|e| VerifyError::Body(e.to_string()))
    }
}
