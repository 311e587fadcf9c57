//! HTTP processor tests against an in-process rendering stub.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::future::join_all;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use render_autoscale::{AdaptiveWorkerPool, ApiError, Endpoint, HttpProcessor, PoolConfig};
use serde_json::{json, Value};
use tokio::net::TcpListener;

type Handler = Arc<dyn Fn(&str, Bytes) -> (u16, String) + Send + Sync>;

/// Start a stub server; paths containing `slow` stall for half a second.
async fn spawn_server(handler: Handler) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("Stub server has no address");

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let handler = Arc::clone(&handler);
                    async move {
                        let path = req.uri().path().to_string();
                        let body = req.into_body().collect().await?.to_bytes();
                        if path.contains("slow") {
                            tokio::time::sleep(Duration::from_millis(500)).await;
                        }
                        let (status, text) = handler(&path, body);
                        let response = Response::builder()
                            .status(status)
                            .header("content-type", "application/json")
                            .body(Full::new(Bytes::from(text)))
                            .expect("Failed to build response");
                        Ok::<_, hyper::Error>(response)
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

/// Echoes the request path and body; bodies with `"fail": true` get a 422.
fn echo_handler() -> Handler {
    Arc::new(|path: &str, body: Bytes| {
        let received: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        if received["fail"] == json!(true) {
            let error = json!({ "error": "unprocessable", "id": received["id"] });
            return (422, error.to_string());
        }
        (200, json!({ "path": path, "received": received }).to_string())
    })
}

fn processor(
    addr: SocketAddr,
    path: &str,
    key: Option<&str>,
    timeout: Duration,
) -> HttpProcessor<Value, Value> {
    let endpoint = Endpoint::new(&format!("http://{}", addr), path, key).unwrap();
    HttpProcessor::new(endpoint, timeout).unwrap()
}

#[tokio::test]
async fn test_post_success_with_embedded_key() {
    let addr = spawn_server(echo_handler()).await;
    let processor = processor(addr, "/chromium/pdf", Some("secret"), Duration::from_secs(5));

    let request = json!({ "url": "https://example.com", "landscape": true });
    let response = processor.post(&request).await.unwrap();

    assert_eq!(response["path"], "/secret/chromium/pdf");
    assert_eq!(response["received"], request);
    assert!(!processor.endpoint().to_string().contains("secret"));
}

#[tokio::test]
async fn test_non_success_status_keeps_payload() {
    let addr = spawn_server(Arc::new(|_: &str, _: Bytes| {
        (503, r#"{"error":"cold start","retry_after":2}"#.to_string())
    }))
    .await;
    let processor = processor(addr, "/render", None, Duration::from_secs(5));

    let err = processor.post(&json!({ "id": 1 })).await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.is_server_error());
    assert_eq!(
        err.payload(),
        Some(&json!({ "error": "cold start", "retry_after": 2 }))
    );
    assert_eq!(err.to_json()["status"], 503);
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let addr = spawn_server(Arc::new(|_: &str, _: Bytes| (200, "<html>oops</html>".to_string()))).await;
    let processor = processor(addr, "/render", None, Duration::from_secs(5));

    match processor.post(&json!({})).await {
        Err(ApiError::Decode {
            status, payload, ..
        }) => {
            assert_eq!(status, 200);
            assert_eq!(payload, "<html>oops</html>");
        }
        other => panic!("expected decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let addr = spawn_server(echo_handler()).await;
    let processor = processor(addr, "/slow", None, Duration::from_millis(50));

    let err = processor.post(&json!({ "id": 1 })).await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let processor = processor(addr, "/render", None, Duration::from_secs(5));

    let err = processor.post(&json!({})).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_pool_drives_http_processor() {
    let addr = spawn_server(echo_handler()).await;
    let processor = processor(addr, "/render", Some("k"), Duration::from_secs(5));
    let config = PoolConfig::new("http")
        .with_worker_min(2)
        .with_worker_max(4)
        .with_growth_cooldown(Duration::from_millis(10));
    let pool = AdaptiveWorkerPool::new(processor, config).unwrap();

    let submissions: Vec<_> = (0..6)
        .map(|id| pool.submit(json!({ "id": id, "fail": id == 4 })))
        .collect();
    let results = join_all(submissions).await;

    for (id, result) in results.iter().enumerate() {
        if id == 4 {
            let err = result.as_ref().unwrap_err();
            assert_eq!(err.status(), Some(422));
            assert_eq!(err.payload().unwrap()["id"], 4);
        } else {
            let body = result.as_ref().unwrap();
            assert_eq!(body["received"]["id"], id);
            assert_eq!(body["path"], "/k/render");
        }
    }

    let stats = pool.stats();
    assert_eq!(stats.succeeded, 5);
    assert_eq!(stats.failed, 1);
}
