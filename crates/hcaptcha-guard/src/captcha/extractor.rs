//! Proof token extraction.

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{FromRequest, Multipart},
    http::{Request, header},
};
use hcaptcha_common::constants::DEFAULT_TOKEN_FIELD;

use super::CaptchaRequest;

/// Pulls the proof token out of an inbound request
#[async_trait]
pub trait TokenExtractor: Send + Sync {
    async fn extract(&self, request: &CaptchaRequest<'_>) -> Option<String>;
}

/// Reads a named field from a form body.
///
/// Understands `application/x-www-form-urlencoded` and `multipart/form-data`.
/// Any other content type yields no token.
#[derive(Debug, Clone)]
pub struct FormFieldExtractor {
    field: String,
}

impl FormFieldExtractor {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    fn from_urlencoded(&self, request: &CaptchaRequest<'_>) -> Option<String> {
        url::form_urlencoded::parse(request.body)
            .find(|(name, _)| name == self.field.as_str())
            .map(|(_, value)| value.into_owned())
    }

    async fn from_multipart(&self, request: &CaptchaRequest<'_>, content_type: &str) -> Option<String> {
        // Multipart consumes its body, so parse a copy of the buffered bytes
        let copy = Request::builder()
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(request.body.clone()))
            .ok()?;

        let mut multipart = match Multipart::from_request(copy, &()).await {
            Ok(m) => m,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected multipart body");
                return None;
            }
        };

        loop {
            match multipart.next_field().await {
                Ok(Some(field)) => {
                    if field.name() == Some(self.field.as_str()) {
                        return field.text().await.ok();
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    tracing::debug!(error = %e, "Malformed multipart body");
                    return None;
                }
            }
        }
    }
}

impl Default for FormFieldExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_FIELD)
    }
}

#[async_trait]
impl TokenExtractor for FormFieldExtractor {
    async fn extract(&self, request: &CaptchaRequest<'_>) -> Option<String> {
        let content_type = request.content_type()?;
        let mime = content_type.split(';').next().unwrap_or_default().trim();

        if mime.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            self.from_urlencoded(request)
        } else if mime.eq_ignore_ascii_case("multipart/form-data") {
            self.from_multipart(request, content_type).await
        } else {
            None
        }
    }
}
