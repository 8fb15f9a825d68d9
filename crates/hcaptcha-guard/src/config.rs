//! Configuration management for the demo server.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use hcaptcha_common::constants::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LISTEN_ADDR, DEFAULT_TOKEN_FIELD, DEFAULT_VERIFY_URL,
    MAX_BODY_BYTES,
};
use hcaptcha_guard::{FormFieldExtractor, HCaptcha, HCaptchaConfig, ReqwestSiteVerifyClient};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// hCaptcha configuration
    #[serde(default)]
    pub hcaptcha: HCaptchaSettings,
}

/// hCaptcha-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HCaptchaSettings {
    /// Account secret (required, usually supplied via HCAPTCHA_SECRET)
    #[serde(default)]
    pub secret: String,

    /// Expected site key
    #[serde(default)]
    pub site_key: Option<String>,

    /// Forward the caller IP to siteverify
    #[serde(default)]
    pub enable_user_ip_validation: bool,

    /// siteverify endpoint
    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    /// Timeout for the siteverify call in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Form field carrying the proof token
    #[serde(default = "default_token_field")]
    pub token_field: String,

    /// Largest protected request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Resolve remoteip from the socket peer only
    #[serde(default)]
    pub ignore_proxy_headers: bool,
}

impl Default for HCaptchaSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            site_key: None,
            enable_user_ip_validation: false,
            verify_url: default_verify_url(),
            timeout_secs: default_timeout(),
            token_field: default_token_field(),
            max_body_bytes: default_max_body_bytes(),
            ignore_proxy_headers: false,
        }
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_verify_url() -> String { DEFAULT_VERIFY_URL.to_string() }
fn default_timeout() -> u64 { DEFAULT_HTTP_TIMEOUT_SECS } // 10 seconds
fn default_token_field() -> String { DEFAULT_TOKEN_FIELD.to_string() }
fn default_max_body_bytes() -> usize { MAX_BODY_BYTES } // 2 MiB

impl HCaptchaSettings {
    /// Build the middleware handle from these settings
    pub fn build(&self) -> Result<HCaptcha> {
        let client = ReqwestSiteVerifyClient::with_timeout(Duration::from_secs(self.timeout_secs))?;

        let mut config = HCaptchaConfig::new(self.secret.clone())
            .user_ip_validation(self.enable_user_ip_validation)
            .token_extractor(FormFieldExtractor::new(self.token_field.clone()))
            .http_client(client)
            .verify_url(self.verify_url.clone())
            .max_body_bytes(self.max_body_bytes)
            .ignore_proxy_headers(self.ignore_proxy_headers);

        if let Some(ref site_key) = self.site_key {
            config = config.site_key(site_key.clone());
        }

        HCaptcha::new(config).context("Invalid hCaptcha configuration")
    }
}

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref secret) = args.secret {
            config.hcaptcha.secret = secret.clone();
        }
        if let Some(ref site_key) = args.site_key {
            config.hcaptcha.site_key = Some(site_key.clone());
        }
        if let Some(ref verify_url) = args.verify_url {
            config.hcaptcha.verify_url = verify_url.clone();
        }
        if args.user_ip_validation {
            config.hcaptcha.enable_user_ip_validation = true;
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            hcaptcha: HCaptchaSettings::default(),
        }
    }
}
