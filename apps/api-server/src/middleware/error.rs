//! Error handling - RFC 7807 compliant responses.

use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError, http::StatusCode};
use serde_json::json;
use std::fmt;

use tally_core::QuotaExceeded;
use tally_core::domain::{MAX_POST_CHARS, PostTextError};
use tally_core::ports::PublishError;
use tally_shared::ErrorResponse;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest { code: &'static str, detail: String },
    Validation(PostTextError),
    QuotaExceeded(QuotaExceeded),
    Upstream(PublishError),
}

impl AppError {
    pub fn invalid_request(detail: impl Into<String>) -> Self {
        AppError::BadRequest {
            code: "INVALID_REQUEST",
            detail: detail.into(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest { detail, .. } => write!(f, "Bad request: {}", detail),
            AppError::Validation(err) => write!(f, "{}", err),
            AppError::QuotaExceeded(err) => write!(f, "{}", err),
            AppError::Upstream(err) => write!(f, "{}", err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(err) => match err {
                PublishError::Unauthorized => StatusCode::UNAUTHORIZED,
                PublishError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                PublishError::Rejected(_) => StatusCode::BAD_REQUEST,
                PublishError::Upstream(_) | PublishError::Connection(_) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut builder = HttpResponse::build(status);

        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest { code, detail } => ErrorResponse::bad_request(code, detail),
            AppError::Validation(err) => {
                ErrorResponse::bad_request("VALIDATION_ERROR", "Post validation failed").with_details(
                    json!({
                        "errors": err.errors,
                        "text_length": err.text_length,
                        "max_length": MAX_POST_CHARS,
                    }),
                )
            }
            AppError::QuotaExceeded(err) => {
                let retry_after = err.retry_after_secs();
                insert_retry_headers(&mut builder, retry_after);
                builder
                    .insert_header(("X-RateLimit-Limit", err.limit.to_string()))
                    .insert_header(("X-RateLimit-Reset", err.reset_time.timestamp().to_string()));

                ErrorResponse::too_many_requests(err.to_string(), retry_after).with_details(json!({
                    "window": err.granularity,
                    "limit": err.limit,
                    "current": err.current,
                    "reset_time": err.reset_time.to_rfc3339(),
                }))
            }
            AppError::Upstream(err) => upstream_error(&mut builder, err),
        };

        builder.json(error)
    }
}

fn insert_retry_headers(builder: &mut HttpResponseBuilder, retry_after: u64) {
    builder
        .insert_header(("Retry-After", retry_after.to_string()))
        .insert_header(("X-RateLimit-Remaining", "0"));
}

fn upstream_error(builder: &mut HttpResponseBuilder, err: &PublishError) -> ErrorResponse {
    match err {
        PublishError::Unauthorized => {
            ErrorResponse::unauthorized("Invalid upstream API credentials")
        }
        PublishError::RateLimited { retry_after_secs } => {
            insert_retry_headers(builder, *retry_after_secs);
            ErrorResponse::new(429, "Too Many Requests", "UPSTREAM_RATE_LIMITED")
                .with_detail("Upstream API rate limit exceeded")
                .with_retry_after(*retry_after_secs)
        }
        PublishError::Rejected(detail) => ErrorResponse::bad_request("INVALID_REQUEST", detail),
        PublishError::Upstream(detail) | PublishError::Connection(detail) => {
            tracing::error!("Upstream API failure: {}", detail);
            ErrorResponse::new(502, "Bad Gateway", "UPSTREAM_ERROR")
                .with_detail("The upstream API request failed")
        }
    }
}

// Conversion from domain errors
impl From<QuotaExceeded> for AppError {
    fn from(err: QuotaExceeded) -> Self {
        AppError::QuotaExceeded(err)
    }
}

impl From<PostTextError> for AppError {
    fn from(err: PostTextError) -> Self {
        AppError::Validation(err)
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        AppError::Upstream(err)
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
