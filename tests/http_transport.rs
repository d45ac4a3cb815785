use std::time::Duration;

use serde_json::json;
use streamvisor::{
    CloseReason, ConnectionState, ReconnectPolicy, StreamClient, StreamError, SubscriptionConfig,
    TransportConfig,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const SSE_HEAD: &str = "HTTP/1.1 200 OK\r\n\
Content-Type: text/event-stream\r\n\
Cache-Control: no-cache\r\n\
Connection: close\r\n\r\n";

/// Serves one canned response per accepted connection and returns the
/// request heads it saw.
async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut heads = Vec::new();
        for response in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            heads.push(String::from_utf8_lossy(&buf).to_ascii_lowercase());

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
        heads
    });
    (base, handle)
}

fn sse(body: &str) -> String {
    format!("{SSE_HEAD}{body}")
}

#[tokio::test]
async fn test_resumes_with_cursor_after_server_close() {
    let (base, server) = serve(vec![
        sse("id: 1\nevent: progress\ndata: {\"step\":1}\n\nid: 2\nevent: progress\ndata: {\"step\":2}\n\n"),
        sse(": keep-alive\n\nid: 3\nevent: completed\ndata: {\"status\":\"ok\"}\n\n"),
    ])
    .await;

    let client = StreamClient::new().unwrap();
    let config = SubscriptionConfig::parse(&format!("{base}/stream/abc"))
        .unwrap()
        .with_watched_kinds(["progress"])
        .with_reconnect(ReconnectPolicy::fixed(Duration::from_millis(50)));
    let sub = client.subscribe(config);

    let state = tokio::time::timeout(Duration::from_secs(10), sub.closed())
        .await
        .expect("stream did not complete");
    assert_eq!(state, ConnectionState::Closed(CloseReason::Completed));

    let payloads: Vec<_> = sub.events().iter().map(|e| e.payload.clone()).collect();
    assert_eq!(
        payloads,
        vec![json!({"step":1}), json!({"step":2}), json!({"status":"ok"})]
    );
    assert_eq!(sub.last_cursor().as_deref(), Some("3"));

    let heads = server.await.unwrap();
    assert!(heads[0].starts_with("get /stream/abc http/1.1"));
    assert!(heads[0].contains("accept: text/event-stream"));
    assert!(!heads[0].contains("last-event-id"));

    assert!(heads[1].starts_with("get /stream/abc?last_event_id=2 http/1.1"));
    assert!(heads[1].contains("last-event-id: 2"));
}

#[tokio::test]
async fn test_wrong_content_type_is_not_retried() {
    let (base, server) = serve(vec![
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{}"
            .to_string(),
    ])
    .await;

    let client = StreamClient::new().unwrap();
    let config = SubscriptionConfig::parse(&format!("{base}/stream/abc")).unwrap();
    let sub = client.subscribe(config);

    let state = tokio::time::timeout(Duration::from_secs(10), sub.closed())
        .await
        .expect("stream did not close");
    assert_eq!(state, ConnectionState::Closed(CloseReason::Error));
    assert_eq!(
        sub.error(),
        Some(StreamError::ContentType {
            content_type: "application/json".into()
        })
    );
    assert_eq!(server.await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_not_found_closes_with_status() {
    let (base, _server) = serve(vec![
        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(),
    ])
    .await;

    let client = StreamClient::new().unwrap();
    let config = SubscriptionConfig::parse(&format!("{base}/stream/missing")).unwrap();
    let sub = client.subscribe(config);

    let state = tokio::time::timeout(Duration::from_secs(10), sub.closed())
        .await
        .expect("stream did not close");
    assert_eq!(state, ConnectionState::Closed(CloseReason::Error));
    assert_eq!(sub.error(), Some(StreamError::Status { status: 404 }));
    assert!(sub.is_empty());
}

#[tokio::test]
async fn test_connection_refused_without_reconnect() {
    // bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = StreamClient::new().unwrap();
    let config = SubscriptionConfig::parse(&format!("http://{addr}/stream/abc"))
        .unwrap()
        .without_reconnect();
    let sub = client.subscribe(config);

    let state = tokio::time::timeout(Duration::from_secs(10), sub.closed())
        .await
        .expect("stream did not close");
    assert_eq!(state, ConnectionState::Closed(CloseReason::Error));
    assert!(matches!(sub.error(), Some(StreamError::Transport { .. })));
}

#[tokio::test]
async fn test_silent_server_fails_handshake() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, mut seen_rx) = tokio::sync::mpsc::unbounded_channel();

    // accepts and reads the request, never answers
    let _server = tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut chunk = [0u8; 1024];
            let _ = socket.read(&mut chunk).await;
            let _ = seen_tx.send(());
            held.push(socket);
        }
    });

    let transport = TransportConfig {
        handshake_timeout: Duration::from_millis(200),
        ..TransportConfig::default()
    };
    let client = StreamClient::builder()
        .with_transport_config(transport)
        .build()
        .unwrap();
    let config = SubscriptionConfig::parse(&format!("http://{addr}/stream/abc"))
        .unwrap()
        .with_reconnect(ReconnectPolicy::fixed(Duration::from_millis(50)).with_max_attempts(1));
    let sub = client.subscribe(config);

    let state = tokio::time::timeout(Duration::from_secs(10), sub.closed())
        .await
        .expect("handshake never timed out");
    assert_eq!(state, ConnectionState::Closed(CloseReason::Error));
    assert!(matches!(
        sub.error(),
        Some(StreamError::Exhausted { attempts: 1, .. })
    ));

    // first attempt plus one reconnect
    seen_rx.recv().await.unwrap();
    seen_rx.recv().await.unwrap();
}
