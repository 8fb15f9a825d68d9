//! hCaptcha verification.
//!
//! The [`HCaptcha`] handle owns the validated configuration and is shared by
//! every request through [`HCaptchaLayer`]. The three injectable seams are
//! [`TokenExtractor`], [`SiteVerifyClient`] and [`ErrorResponder`].

mod client;
mod config;
mod extractor;
mod layer;
mod responder;
mod verifier;

pub use client::{ReqwestSiteVerifyClient, SiteVerifyClient};
pub use config::HCaptchaConfig;
pub use extractor::{FormFieldExtractor, TokenExtractor};
pub use layer::{HCaptchaLayer, HCaptchaService};
pub use responder::{ErrorResponder, JsonErrorResponder};
pub use verifier::HCaptcha;

use axum::body::Bytes;
use axum::http::request::Parts;
use std::net::IpAddr;

/// Read-only view of an inbound request.
///
/// The body has already been buffered by the layer, so extractors can read
/// it without consuming the request.
#[derive(Debug, Clone, Copy)]
pub struct CaptchaRequest<'a> {
    pub parts: &'a Parts,
    pub body: &'a Bytes,
    pub client_ip: Option<IpAddr>,
}

impl<'a> CaptchaRequest<'a> {
    pub fn new(parts: &'a Parts, body: &'a Bytes, client_ip: Option<IpAddr>) -> Self {
        Self {
            parts,
            body,
            client_ip,
        }
    }

    /// `Content-Type` header value, if present and valid UTF-8
    pub fn content_type(&self) -> Option<&str> {
        self.parts
            .headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}
