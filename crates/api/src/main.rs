use anyhow::Context;

use careerdesk_ai::{AiQueueConfig, AiRequestQueue};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    careerdesk_observability::init();

    let config = AiQueueConfig::from_env().context("invalid AI queue configuration")?;
    let queue = AiRequestQueue::spawn(config).context("failed to start AI request queue")?;

    let app = careerdesk_api::app::build_app(queue);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
