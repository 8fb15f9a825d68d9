//! HTTP routes for the demo server.

use axum::{
    Router,
    routing::{get, post},
};
use hcaptcha_guard::HCaptcha;
use tower_http::trace::TraceLayer;

mod health;

/// Create the main application router
pub fn create_router(hcaptcha: HCaptcha) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))

        // hCaptcha protected endpoint
        .route("/", post(protected).layer(hcaptcha.layer()))

        .layer(TraceLayer::new_for_http())
}

/// Only reached once the captcha has been verified
async fn protected() -> &'static str {
    "good"
}
