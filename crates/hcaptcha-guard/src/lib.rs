//! # hCaptcha Guard
//!
//! Middleware that verifies an hCaptcha proof token before a request reaches
//! the protected handler.
//!
//! ```text
//! Client → HCaptchaLayer → Handler
//!               ↓
//!         hcaptcha.com/siteverify
//! ```
//!
//! ```ignore
//! let hcaptcha = HCaptcha::with_defaults("0x0000000000000000000000000000000000000000")?;
//! let app = Router::new().route("/", post(handler).layer(hcaptcha.layer()));
//! ```

pub mod captcha;
pub mod client_ip;

pub use captcha::{
    CaptchaRequest, ErrorResponder, FormFieldExtractor, HCaptcha, HCaptchaConfig, HCaptchaLayer,
    HCaptchaService, JsonErrorResponder, ReqwestSiteVerifyClient, SiteVerifyClient,
    TokenExtractor,
};
pub use client_ip::ClientIp;
pub use hcaptcha_common::{ConfigError, SiteVerifyRequest, SiteVerifyResponse, VerifyError};
