//! Tower middleware wrapping the verification gate.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::Request,
    response::Response,
};
use tower::{Layer, Service};

use super::{CaptchaRequest, HCaptcha};
use crate::client_ip::ClientIp;

/// Tower layer that verifies hCaptcha before the inner service runs
#[derive(Clone)]
pub struct HCaptchaLayer {
    hcaptcha: HCaptcha,
}

impl HCaptchaLayer {
    pub fn new(hcaptcha: HCaptcha) -> Self {
        Self { hcaptcha }
    }
}

impl<S> Layer<S> for HCaptchaLayer {
    type Service = HCaptchaService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HCaptchaService {
            inner,
            hcaptcha: self.hcaptcha.clone(),
        }
    }
}

/// hCaptcha middleware service.
///
/// On success the decoded [`SiteVerifyResponse`](hcaptcha_common::SiteVerifyResponse)
/// is inserted into the request extensions. On failure the configured error
/// response is returned and the inner service is never called.
#[derive(Clone)]
pub struct HCaptchaService<S> {
    inner: S,
    hcaptcha: HCaptcha,
}

impl<S> Service<Request<Body>> for HCaptchaService<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // Take the service that was driven to readiness, leave a fresh clone behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let hcaptcha = self.hcaptcha.clone();

        Box::pin(async move {
            let client_ip = if hcaptcha.ignore_proxy_headers() {
                ClientIp::from_peer(&req)
            } else {
                ClientIp::from_request(&req)
            };
            let (mut parts, body) = req.into_parts();

            let bytes = match axum::body::to_bytes(body, hcaptcha.max_body_bytes()).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot buffer request body for hCaptcha");
                    return Ok(hcaptcha.reject(&parts));
                }
            };

            let verdict = hcaptcha
                .check(&CaptchaRequest::new(&parts, &bytes, client_ip.ip()))
                .await;

            match verdict {
                Some(reply) => {
                    parts.extensions.insert(reply);
                    inner.call(Request::from_parts(parts, Body::from(bytes))).await
                }
                None => Ok(hcaptcha.reject(&parts)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captcha::HCaptchaConfig;
    use crate::captcha::testing::{MockClient, Reply, multipart_body, multipart_content_type};
    use axum::{
        Extension, Form, Router,
        extract::ConnectInfo,
        http::StatusCode,
        routing::{get, post},
    };
    use hcaptcha_common::{SiteVerifyResponse, constants::MAX_BODY_BYTES};
    use std::net::SocketAddr;
    use serde::Deserialize;
    use tower::ServiceExt;

    const SECRET: &str = "0x0000000000000000000000000000000000000000";

    fn router(client: &MockClient) -> Router {
        let hcaptcha = HCaptcha::new(HCaptchaConfig::new(SECRET).http_client(client.clone())).unwrap();

        Router::new()
            .route("/", post(|| async { "good" }).layer(hcaptcha.layer()))
            .route("/open", get(|| async { "open" }))
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::post("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let client = MockClient::new(Reply::Body(r#"{"success": true}"#));
        let response = router(&client)
            .oneshot(form_request("h-captcha-response=abc"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "good");
        assert_eq!(client.last().response, "abc");
    }

    #[tokio::test]
    async fn test_invalid_token_is_rejected() {
        let client = MockClient::new(Reply::Body(r#"{"success": false}"#));
        let response = router(&client)
            .oneshot(form_request("h-captcha-response=abc"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_string(response).await, r#"{"message":"invalid captcha"}"#);
    }

    #[tokio::test]
    async fn test_transport_failure_is_rejected() {
        let client = MockClient::new(Reply::Transport);
        let request = Request::post("/")
            .header("content-type", multipart_content_type())
            .body(Body::from(multipart_body("h-captcha-response", "abc")))
            .unwrap();
        let response = router(&client).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unguarded_route_skips_verification() {
        let client = MockClient::new(Reply::Transport);
        let request = Request::get("/open").body(Body::empty()).unwrap();
        let response = router(&client).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_handler_sees_body_and_reply() {
        #[derive(Deserialize)]
        struct Comment {
            comment: String,
        }

        let client = MockClient::new(Reply::Body(
            r#"{"success": true, "hostname": "example.com", "score": 0.1}"#,
        ));
        let hcaptcha = HCaptcha::new(HCaptchaConfig::new(SECRET).http_client(client.clone())).unwrap();

        let app = Router::new()
            .route(
                "/",
                post(
                    |Extension(reply): Extension<SiteVerifyResponse>, Form(form): Form<Comment>| async move {
                        format!("{} from {}", form.comment, reply.hostname.unwrap_or_default())
                    },
                ),
            )
            .layer(hcaptcha.layer());

        let response = app
            .oneshot(form_request("comment=hi&h-captcha-response=abc"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "hi from example.com");
    }

    #[tokio::test]
    async fn test_custom_error_responder() {
        let client = MockClient::new(Reply::Body(r#"{"success": false}"#));
        let hcaptcha = HCaptcha::new(
            HCaptchaConfig::new(SECRET)
                .http_client(client.clone())
                .error_responder(|_: &axum::http::request::Parts| {
                    axum::response::IntoResponse::into_response((StatusCode::TOO_MANY_REQUESTS, "slow down"))
                }),
        )
        .unwrap();

        let app = Router::new().route("/", post(|| async { "good" }).layer(hcaptcha.layer()));
        let response = app.oneshot(form_request("h-captcha-response=abc")).await.unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_string(response).await, "slow down");
    }

    #[tokio::test]
    async fn test_forwarded_ip_is_sent_when_enabled() {
        let client = MockClient::new(Reply::Body(r#"{"success": true}"#));
        let hcaptcha = HCaptcha::new(
            HCaptchaConfig::new(SECRET)
                .user_ip_validation(true)
                .http_client(client.clone()),
        )
        .unwrap();

        let app = Router::new().route("/", post(|| async { "good" }).layer(hcaptcha.layer()));
        let request = Request::post("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "198.51.100.23, 10.0.0.1")
            .body(Body::from("h-captcha-response=abc"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(client.last().remoteip.as_deref(), Some("198.51.100.23"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let client = MockClient::new(Reply::Body(r#"{"success": true}"#));
        let body = format!("h-captcha-response=abc&pad={}", "x".repeat(MAX_BODY_BYTES));
        let response = router(&client).oneshot(form_request(&body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_raised_body_limit_accepts_large_upload() {
        let client = MockClient::new(Reply::Body(r#"{"success": true}"#));
        let hcaptcha = HCaptcha::new(
            HCaptchaConfig::new(SECRET)
                .max_body_bytes(8 * 1024 * 1024)
                .http_client(client.clone()),
        )
        .unwrap();

        let app = Router::new().route(
            "/",
            post(|req: Request<Body>| async move {
                let body = axum::body::to_bytes(req.into_body(), usize::MAX).await.unwrap();
                body.len().to_string()
            })
            .layer(hcaptcha.layer()),
        );

        let boundary = "upload-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"h-captcha-response\"\r\n\r\nabc\r\n\
             --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"big.bin\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        );
        body.push_str(&"x".repeat(3 * 1024 * 1024));
        body.push_str(&format!("\r\n--{boundary}--\r\n"));
        let expected_len = body.len();

        let request = Request::post("/")
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, expected_len.to_string());
        assert_eq!(client.last().response, "abc");
    }

    #[tokio::test]
    async fn test_proxy_headers_ignored_when_configured() {
        let client = MockClient::new(Reply::Body(r#"{"success": true}"#));
        let hcaptcha = HCaptcha::new(
            HCaptchaConfig::new(SECRET)
                .user_ip_validation(true)
                .ignore_proxy_headers(true)
                .http_client(client.clone()),
        )
        .unwrap();

        let app = Router::new().route("/", post(|| async { "good" }).layer(hcaptcha.layer()));
        let mut request = Request::post("/")
            .header("content-type", "application/x-www-form-urlencoded")
            .header("x-forwarded-for", "198.51.100.23")
            .body(Body::from("h-captcha-response=abc"))
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo("192.0.2.10:40000".parse::<SocketAddr>().unwrap()));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(client.last().remoteip.as_deref(), Some("192.0.2.10"));
    }
}
