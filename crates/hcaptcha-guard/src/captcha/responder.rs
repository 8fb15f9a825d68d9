//! Rejection responses.

use axum::{
    Json,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use hcaptcha_common::{
    ErrorMessage,
    constants::{DEFAULT_ERROR_MESSAGE, DEFAULT_ERROR_STATUS},
};

/// Produces the response sent when verification fails.
///
/// Any `Fn(&Parts) -> Response` closure is a responder too.
pub trait ErrorResponder: Send + Sync {
    fn respond(&self, parts: &Parts) -> Response;
}

impl<F> ErrorResponder for F
where
    F: Fn(&Parts) -> Response + Send + Sync,
{
    fn respond(&self, parts: &Parts) -> Response {
        self(parts)
    }
}

/// `{"message": ...}` JSON body with a fixed status
#[derive(Debug, Clone)]
pub struct JsonErrorResponder {
    status: StatusCode,
    message: String,
}

impl JsonErrorResponder {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl Default for JsonErrorResponder {
    fn default() -> Self {
        Self {
            status: StatusCode::from_u16(DEFAULT_ERROR_STATUS).unwrap_or(StatusCode::FORBIDDEN),
            message: DEFAULT_ERROR_MESSAGE.to_string(),
        }
    }
}

impl ErrorResponder for JsonErrorResponder {
    fn respond(&self, _parts: &Parts) -> Response {
        let body = ErrorMessage {
            message: self.message.clone(),
        };
        (self.status, Json(body)).into_response()
    }
}
