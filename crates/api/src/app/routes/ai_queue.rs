//! Operator routes for the AI request queue.
//!
//! Dashboards poll the status; an upstream health monitor pauses and resumes
//! the queue, and adjusts concurrency to the provider's observed rate limits.

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

use careerdesk_ai::AiRequestQueue;

use crate::app::dto::{ClearResponse, MaxConcurrentResponse, SetMaxConcurrentRequest};
use crate::app::errors;

pub fn router() -> Router {
    Router::new()
        .route("/", get(status))
        .route("/pause", post(pause))
        .route("/resume", post(resume))
        .route("/max-concurrent", put(set_max_concurrent))
        .route("/clear", post(clear))
}

/// GET /admin/ai-queue
pub async fn status(Extension(queue): Extension<AiRequestQueue>) -> Response {
    match queue.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => errors::queue_error_to_response(&e),
    }
}

/// POST /admin/ai-queue/pause
pub async fn pause(Extension(queue): Extension<AiRequestQueue>) -> Response {
    if let Err(e) = queue.pause().await {
        return errors::queue_error_to_response(&e);
    }
    tracing::info!("ai queue paused via admin api");
    status(Extension(queue)).await
}

/// POST /admin/ai-queue/resume
pub async fn resume(Extension(queue): Extension<AiRequestQueue>) -> Response {
    if let Err(e) = queue.resume().await {
        return errors::queue_error_to_response(&e);
    }
    tracing::info!("ai queue resumed via admin api");
    status(Extension(queue)).await
}

/// PUT /admin/ai-queue/max-concurrent
pub async fn set_max_concurrent(
    Extension(queue): Extension<AiRequestQueue>,
    Json(body): Json<SetMaxConcurrentRequest>,
) -> Response {
    match queue.set_max_concurrent(body.max_concurrent).await {
        Ok(applied) => Json(MaxConcurrentResponse {
            max_concurrent: applied,
        })
        .into_response(),
        Err(e) => errors::queue_error_to_response(&e),
    }
}

/// POST /admin/ai-queue/clear
pub async fn clear(Extension(queue): Extension<AiRequestQueue>) -> Response {
    match queue.clear().await {
        Ok(cleared) => Json(ClearResponse { cleared }).into_response(),
        Err(e) => errors::queue_error_to_response(&e),
    }
}
