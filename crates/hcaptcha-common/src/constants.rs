//! Shared defaults for the hCaptcha guard.

/// hCaptcha siteverify endpoint
pub const DEFAULT_VERIFY_URL: &str = "https://hcaptcha.com/siteverify";

/// Timeout for the outbound siteverify call (10 seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Form field the hCaptcha widget posts the proof token under
pub const DEFAULT_TOKEN_FIELD: &str = "h-captcha-response";

/// Status code returned when verification fails
pub const DEFAULT_ERROR_STATUS: u16 = 403;

/// Message returned when verification fails
pub const DEFAULT_ERROR_MESSAGE: &str = "invalid captcha";

/// Largest inbound body buffered while looking for the token (2 MiB)
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Default demo server listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
