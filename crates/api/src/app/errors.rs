use axum::http::{header, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use careerdesk_ai::QueueError;

/// Map a queue error to a "busy, retry in N seconds" style response.
pub fn queue_error_to_response(err: &QueueError) -> axum::response::Response {
    let status = match err {
        QueueError::QueueFull { .. } | QueueError::ServicePaused | QueueError::Shutdown => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        QueueError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        QueueError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        QueueError::QueueCleared => StatusCode::CONFLICT,
        QueueError::Abandoned => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let retry_after_secs = err.retry_after().map(|d| d.as_secs());

    let mut response = (
        status,
        axum::Json(json!({
            "error": err.code(),
            "message": err.to_string(),
            "retry_after_secs": retry_after_secs,
        })),
    )
        .into_response();

    if let Some(secs) = retry_after_secs {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs));
    }
    response
}
