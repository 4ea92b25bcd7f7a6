use axum::Router;

pub mod ai_queue;
pub mod system;

/// Router for operator endpoints.
pub fn router() -> Router {
    Router::new().nest("/ai-queue", ai_queue::router())
}
