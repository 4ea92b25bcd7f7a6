use std::time::Duration;

use careerdesk_ai::{AiQueueConfig, AiRequestQueue, Priority, QueueError, QueueStatus};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    queue: AiRequestQueue,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(config: AiQueueConfig) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let queue = AiRequestQueue::spawn(config).expect("valid queue config");
        let app = careerdesk_api::app::build_app(queue.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            queue,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_status(client: &reqwest::Client, srv: &TestServer) -> QueueStatus {
    let res = client.get(srv.url("/admin/ai-queue")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn(AiQueueConfig::default()).await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn status_reports_configured_defaults() {
    let srv = TestServer::spawn(AiQueueConfig::default().with_max_concurrent(4)).await;
    let client = reqwest::Client::new();

    let status = get_status(&client, &srv).await;
    assert_eq!(status.max_concurrent, 4);
    assert_eq!(status.queue_length, 0);
    assert_eq!(status.active_requests, 0);
    assert!(status.is_accepting_requests);
    assert!(!status.paused);
}

#[tokio::test]
async fn pause_and_resume_toggle_admission() {
    let srv = TestServer::spawn(AiQueueConfig::default()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/admin/ai-queue/pause"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let status: QueueStatus = res.json().await.unwrap();
    assert!(status.paused);
    assert!(!status.is_accepting_requests);

    let err = srv
        .queue
        .enqueue(|| async { Ok::<_, String>(()) }, Priority::Normal, None)
        .await
        .unwrap_err();
    assert_eq!(err.queue_error(), Some(&QueueError::ServicePaused));

    let res = client
        .post(srv.url("/admin/ai-queue/resume"))
        .send()
        .await
        .unwrap();
    let status: QueueStatus = res.json().await.unwrap();
    assert!(!status.paused);

    let ok = srv
        .queue
        .enqueue(|| async { Ok::<_, String>("generated") }, Priority::Normal, None)
        .await
        .unwrap();
    assert_eq!(ok, "generated");
}

#[tokio::test]
async fn max_concurrent_is_clamped() {
    let srv = TestServer::spawn(AiQueueConfig::default()).await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/admin/ai-queue/max-concurrent"))
        .json(&json!({ "max_concurrent": 200 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["max_concurrent"], 50);

    assert_eq!(get_status(&client, &srv).await.max_concurrent, 50);
}

#[tokio::test]
async fn clear_rejects_waiting_requests() {
    let srv = TestServer::spawn(AiQueueConfig::default().with_max_concurrent(1)).await;
    let client = reqwest::Client::new();

    let (release, gate) = tokio::sync::oneshot::channel::<()>();
    let running = srv
        .queue
        .submit(
            move || async move {
                let _ = gate.await;
                Ok::<_, String>("resume text")
            },
            Priority::Normal,
            None,
        )
        .await
        .unwrap();
    let waiting = srv
        .queue
        .submit(|| async { Ok::<_, String>("cover letter") }, Priority::Low, None)
        .await
        .unwrap();

    assert_eq!(get_status(&client, &srv).await.queue_length, 1);

    let res = client
        .post(srv.url("/admin/ai-queue/clear"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["cleared"], 1);

    let err = waiting.await.unwrap_err();
    assert_eq!(err.queue_error(), Some(&QueueError::QueueCleared));

    release.send(()).unwrap();
    let done = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("running request settles");
    assert_eq!(done.unwrap(), "resume text");
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let srv = TestServer::spawn(AiQueueConfig::default()).await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/admin/ai-queue/max-concurrent"))
        .json(&json!({ "max_concurrent": "lots" }))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());
}
