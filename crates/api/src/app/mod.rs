//! HTTP API application wiring (Axum router + shared state).
//!
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use axum::{routing::get, Extension, Router};

use careerdesk_ai::AiRequestQueue;

pub mod dto;
pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(queue: AiRequestQueue) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/admin", routes::router())
        .layer(Extension(queue))
}
