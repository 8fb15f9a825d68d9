//! The verification gate.

use axum::{http::request::Parts, response::Response};
use hcaptcha_common::{ConfigError, SiteVerifyRequest, SiteVerifyResponse, VerifyError};
use std::sync::Arc;

use super::{
    CaptchaRequest, ErrorResponder, HCaptchaConfig, HCaptchaLayer, SiteVerifyClient,
    TokenExtractor,
};

/// Validated, immutable middleware configuration.
///
/// Cheap to clone; every clone shares the same HTTP client and strategies.
#[derive(Clone)]
pub struct HCaptcha {
    inner: Arc<Inner>,
}

struct Inner {
    secret: String,
    site_key: Option<String>,
    enable_user_ip_validation: bool,
    error_responder: Arc<dyn ErrorResponder>,
    token_extractor: Arc<dyn TokenExtractor>,
    http_client: Arc<dyn SiteVerifyClient>,
    verify_url: String,
    max_body_bytes: usize,
    ignore_proxy_headers: bool,
}

impl HCaptcha {
    /// Build with only the secret set and every other option defaulted
    pub fn with_defaults(secret: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(HCaptchaConfig::new(secret))
    }

    /// Validate `config`, fill its defaults and freeze it
    pub fn new(mut config: HCaptchaConfig) -> Result<Self, ConfigError> {
        config.validate_and_fill_defaults()?;

        let HCaptchaConfig {
            secret,
            site_key,
            enable_user_ip_validation,
            error_responder: Some(error_responder),
            token_extractor: Some(token_extractor),
            http_client: Some(http_client),
            verify_url: Some(verify_url),
            max_body_bytes: Some(max_body_bytes),
            ignore_proxy_headers,
        } = config
        else {
            unreachable!("validate_and_fill_defaults populates every option");
        };

        Ok(Self {
            inner: Arc::new(Inner {
                secret,
                site_key,
                enable_user_ip_validation,
                error_responder,
                token_extractor,
                http_client,
                verify_url,
                max_body_bytes,
                ignore_proxy_headers,
            }),
        })
    }

    /// Tower layer that guards the wrapped service with this configuration
    pub fn layer(&self) -> HCaptchaLayer {
        HCaptchaLayer::new(self.clone())
    }

    pub fn verify_url(&self) -> &str {
        &self.inner.verify_url
    }

    pub fn site_key(&self) -> Option<&str> {
        self.inner.site_key.as_deref()
    }

    pub fn user_ip_validation(&self) -> bool {
        self.inner.enable_user_ip_validation
    }

    /// Largest request body the layer buffers
    pub fn max_body_bytes(&self) -> usize {
        self.inner.max_body_bytes
    }

    pub fn ignore_proxy_headers(&self) -> bool {
        self.inner.ignore_proxy_headers
    }

    /// Run one siteverify round trip for `request`.
    pub async fn verify(
        &self,
        request: &CaptchaRequest<'_>,
    ) -> Result<SiteVerifyResponse, VerifyError> {
        let form = self.build_form(request).await;

        let body = self
            .inner
            .http_client
            .post_form(&self.inner.verify_url, &form)
            .await?;

        Ok(serde_json::from_slice::<SiteVerifyResponse>(&body)?)
    }

    /// Pass/fail decision for `request`. Fails closed on every error.
    pub async fn validate(&self, request: &CaptchaRequest<'_>) -> bool {
        self.check(request).await.is_some()
    }

    /// Like [`validate`](Self::validate), but hands back the decoded reply on
    /// success so it can be attached to the request.
    pub(crate) async fn check(&self, request: &CaptchaRequest<'_>) -> Option<SiteVerifyResponse> {
        match self.verify(request).await {
            Ok(reply) if reply.success => {
                tracing::debug!(
                    hostname = ?reply.hostname,
                    score = ?reply.score,
                    "hCaptcha verified"
                );
                Some(reply)
            }
            Ok(reply) => {
                tracing::debug!(
                    error_codes = ?reply.error_codes,
                    client_ip = ?request.client_ip,
                    "hCaptcha rejected"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    kind = e.kind(),
                    error = %e,
                    url = %self.inner.verify_url,
                    "Error in siteverify"
                );
                None
            }
        }
    }

    /// Rejection response for a failed request
    pub fn reject(&self, parts: &Parts) -> Response {
        self.inner.error_responder.respond(parts)
    }

    async fn build_form(&self, request: &CaptchaRequest<'_>) -> SiteVerifyRequest {
        let token = match self.inner.token_extractor.extract(request).await {
            Some(token) => token,
            None => {
                tracing::debug!("No hCaptcha token in request");
                String::new()
            }
        };

        let mut form = SiteVerifyRequest::new(self.inner.secret.clone(), token);

        if self.inner.enable_user_ip_validation {
            match request.client_ip {
                Some(ip) => form.remoteip = Some(ip.to_string()),
                None => tracing::debug!("Client IP unknown, sending without remoteip"),
            }
        }
        form.sitekey = self.inner.site_key.clone();

        form
    }
}
