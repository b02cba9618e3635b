//! HaClient against a throwaway local HTTP server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulse_client::{fetch_snapshot, FetchError, HaClient, SnapshotSource};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one canned response per connection, in order, then repeat the
/// last one. Returns the base URL and a request counter.
async fn serve(responses: Vec<String>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let response = responses[n.min(responses.len() - 1)].clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(read) => buf.extend_from_slice(&chunk[..read]),
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}"), hits)
}

fn response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn client(base: &str, retries: u32) -> HaClient {
    HaClient::new(base, "secret", Duration::from_secs(5), retries, Some("2025.8.1".into())).expect("client")
}

#[tokio::test]
async fn retries_transient_then_succeeds() {
    let states = r#"[{"entity_id": "light.desk", "state": "on", "attributes": {"brightness": 10}}]"#;
    let (base, hits) = serve(vec![
        response("503 Service Unavailable", ""),
        response("200 OK", states),
    ])
    .await;

    let fetched = client(&base, 2).fetch_states().await.expect("states");
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].entity_id, "light.desk");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn permanent_status_fails_without_retry() {
    let (base, hits) = serve(vec![response("401 Unauthorized", r#"{"message": "nope"}"#)]).await;

    let err = client(&base, 3).fetch_states().await.expect_err("401");
    match err {
        FetchError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("nope"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let (base, hits) = serve(vec![response("429 Too Many Requests", "")]).await;

    let err = client(&base, 1).fetch_services().await.expect_err("429");
    assert!(err.is_transient());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn bad_json_is_a_decode_error() {
    let (base, _) = serve(vec![response("200 OK", "not json")]).await;
    let err = client(&base, 0).fetch_states().await.expect_err("decode");
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn snapshot_carries_version() {
    let (base, _) = serve(vec![response("200 OK", "[]")]).await;
    let snap = fetch_snapshot(&client(&base, 0)).await.expect("snapshot");
    assert_eq!(snap.version, "2025.8.1");
    assert!(snap.states.is_empty());
    assert!(snap.services.is_empty());
}
