//! Middleware configuration.

use hcaptcha_common::{
    ConfigError,
    constants::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_VERIFY_URL, MAX_BODY_BYTES},
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{
    ErrorResponder, FormFieldExtractor, JsonErrorResponder, ReqwestSiteVerifyClient,
    SiteVerifyClient, TokenExtractor,
};

/// hCaptcha middleware configuration.
///
/// Only `secret` is mandatory. Everything left unset is filled in by
/// [`HCaptchaConfig::validate_and_fill_defaults`].
#[derive(Clone, Default)]
pub struct HCaptchaConfig {
    /// Account secret, from https://dashboard.hcaptcha.com/settings
    pub secret: String,

    /// Site key the token is expected to be issued for. Disabled when unset.
    pub site_key: Option<String>,

    /// Forward the caller IP as `remoteip`
    pub enable_user_ip_validation: bool,

    /// Response sent on rejection. Defaults to 403 `{"message":"invalid captcha"}`.
    pub error_responder: Option<Arc<dyn ErrorResponder>>,

    /// Where to read the token from. Defaults to the `h-captcha-response` form field.
    pub token_extractor: Option<Arc<dyn TokenExtractor>>,

    /// Transport to siteverify. Defaults to reqwest with a 10 second timeout.
    pub http_client: Option<Arc<dyn SiteVerifyClient>>,

    /// siteverify endpoint. Defaults to https://hcaptcha.com/siteverify.
    pub verify_url: Option<String>,

    /// Largest request body buffered while looking for the token. Larger
    /// bodies are rejected. Defaults to 2 MiB.
    pub max_body_bytes: Option<usize>,

    /// Resolve the caller IP from the socket peer only. When unset,
    /// `CF-Connecting-IP` / `X-Real-IP` / `X-Forwarded-For` are trusted as
    /// sent, which lets a client pick its own `remoteip` unless a proxy in
    /// front overwrites them.
    pub ignore_proxy_headers: bool,
}

impl HCaptchaConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn site_key(mut self, site_key: impl Into<String>) -> Self {
        self.site_key = Some(site_key.into());
        self
    }

    pub fn user_ip_validation(mut self, enabled: bool) -> Self {
        self.enable_user_ip_validation = enabled;
        self
    }

    pub fn error_responder(mut self, responder: impl ErrorResponder + 'static) -> Self {
        self.error_responder = Some(Arc::new(responder));
        self
    }

    pub fn token_extractor(mut self, extractor: impl TokenExtractor + 'static) -> Self {
        self.token_extractor = Some(Arc::new(extractor));
        self
    }

    pub fn http_client(mut self, client: impl SiteVerifyClient + 'static) -> Self {
        self.http_client = Some(Arc::new(client));
        self
    }

    pub fn verify_url(mut self, url: impl Into<String>) -> Self {
        self.verify_url = Some(url.into());
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    pub fn ignore_proxy_headers(mut self, ignore: bool) -> Self {
        self.ignore_proxy_headers = ignore;
        self
    }

    /// Reject an empty secret, then fill every unset optional field with its
    /// default. Mutates `self` in place.
    pub fn validate_and_fill_defaults(&mut self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        if self.site_key.as_deref().is_some_and(str::is_empty) {
            self.site_key = None;
        }
        if self.error_responder.is_none() {
            self.error_responder = Some(Arc::new(JsonErrorResponder::default()));
        }
        if self.token_extractor.is_none() {
            self.token_extractor = Some(Arc::new(FormFieldExtractor::default()));
        }
        if self.http_client.is_none() {
            let client = ReqwestSiteVerifyClient::with_timeout(Duration::from_secs(
                DEFAULT_HTTP_TIMEOUT_SECS,
            ))?;
            self.http_client = Some(Arc::new(client));
        }
        if self.verify_url.as_deref().is_none_or(str::is_empty) {
            self.verify_url = Some(DEFAULT_VERIFY_URL.to_string());
        }
        if self.max_body_bytes.is_none() {
            self.max_body_bytes = Some(MAX_BODY_BYTES);
        }

        Ok(())
    }
}

impl fmt::Debug for HCaptchaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HCaptchaConfig")
            .field("secret", &"<redacted>")
            .field("site_key", &self.site_key)
            .field("enable_user_ip_validation", &self.enable_user_ip_validation)
            .field("error_responder", &self.error_responder.is_some())
            .field("token_extractor", &self.token_extractor.is_some())
            .field("http_client", &self.http_client.is_some())
            .field("verify_url", &self.verify_url)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("ignore_proxy_headers", &self.ignore_proxy_headers)
            .finish()
    }
}
