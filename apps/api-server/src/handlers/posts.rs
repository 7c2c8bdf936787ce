//! Post publishing and quota inspection handlers.

use actix_web::{HttpResponse, web};

use tally_core::domain::{PostText, QuotaStatus, WindowStatus};
use tally_shared::ApiResponse;
use tally_shared::dto::{
    AccountResponse, CreatePostRequest, PostResponse, QuotaLimits, RateLimitStatusResponse,
    WindowUsage,
};

use crate::middleware::error::AppResult;
use crate::observability::RequestId;
use crate::state::AppState;

/// Operation label the publish quota is counted under.
pub const POST_OPERATION: &str = "tweet";

/// POST /api/tweet
///
/// The quota is only consumed once the upstream accepted the post.
pub async fn create_post(
    state: web::Data<AppState>,
    request_id: RequestId,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let text = PostText::parse(body.text.as_ref())?;

    state.gate.check(POST_OPERATION).await?;

    tracing::info!(
        request_id = %request_id.as_str(),
        length = text.char_count(),
        preview = %text.preview(),
        "Publishing post"
    );

    let published = state.publisher.publish(&text).await.map_err(|e| {
        tracing::warn!(request_id = %request_id.as_str(), error = %e, "Publish failed");
        e
    })?;

    state.gate.increment(POST_OPERATION).await;

    tracing::info!(request_id = %request_id.as_str(), post_id = %published.id, "Post published");

    let response = PostResponse {
        id: published.id,
        text: published.text,
        created_at: published.created_at.to_rfc3339(),
    };

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        response,
        "Post published successfully",
    )))
}

/// GET /api/rate-limit-status
pub async fn rate_limit_status(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let status = state.gate.status(POST_OPERATION).await;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(RateLimitStatusResponse {
        tier: state.tier.as_str().to_string(),
        limits: quota_limits(status),
    })))
}

/// GET /api/account
pub async fn account(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let account = state.publisher.account().await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(AccountResponse {
        id: account.id,
        username: account.username,
        name: account.name,
    })))
}

fn quota_limits(status: QuotaStatus) -> QuotaLimits {
    QuotaLimits {
        minute: window_usage(status.minute),
        hour: window_usage(status.hour),
        day: window_usage(status.day),
        month: window_usage(status.month),
    }
}

fn window_usage(window: WindowStatus) -> WindowUsage {
    WindowUsage {
        current: window.current,
        limit: window.limit,
        remaining: window.remaining,
        reset_time: window.reset_time.to_rfc3339(),
    }
}
