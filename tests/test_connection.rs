//! Drives the connection state machine over an in-memory duplex pipe.

use std::sync::Arc;
use std::time::Duration;

use fileserve::config::StaticFilesConfig;
use fileserve::http::connection::{Connection, ConnectionSettings};
use fileserve::http::dispatch::Dispatcher;
use fileserve::store::MemoryStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

fn settings() -> ConnectionSettings {
    ConnectionSettings {
        read_timeout: Duration::from_millis(200),
        max_read_size: 16,
        max_request_size: 256,
    }
}

fn spawn_connection(settings: ConnectionSettings) -> (DuplexStream, JoinHandle<(anyhow::Result<()>, usize)>) {
    let store = MemoryStore::new()
        .with_file("/index.html", "home")
        .with_file("/a.txt", "alpha");
    let dispatcher = Arc::new(Dispatcher::new(store, &StaticFilesConfig::default()));

    let (client, server) = tokio::io::duplex(64 * 1024);
    let handle = tokio::spawn(async move {
        let mut conn = Connection::new(server, dispatcher, settings);
        let result = conn.run().await;
        (result, conn.served())
    });
    (client, handle)
}

async fn exchange(request: &[u8]) -> (String, anyhow::Result<()>, usize) {
    let (mut client, handle) = spawn_connection(settings());

    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    let (result, served) = handle.await.unwrap();
    (String::from_utf8(out).unwrap(), result, served)
}

#[tokio::test]
async fn test_single_request() {
    let (out, result, served) = exchange(b"GET /a.txt HTTP/1.1\r\nHost: x\r\n\r\n").await;

    assert!(result.is_ok());
    assert_eq!(served, 1);
    assert_eq!(
        out,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nalpha"
    );
}

#[tokio::test]
async fn test_pipelined_requests_answered_in_order() {
    let (out, result, served) = exchange(
        b"GET /a.txt HTTP/1.1\r\n\r\nGET / HTTP/1.1\r\n\r\nGET /moved HTTP/1.1\r\n\r\n",
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(served, 3);

    let alpha = out.find("alpha").unwrap();
    let home = out.find("home").unwrap();
    let moved = out.find("302 MOVED TEMPORARILY").unwrap();
    assert!(alpha < home && home < moved);
    assert_eq!(out.matches("HTTP/1.1 ").count(), 3);
}

#[tokio::test]
async fn test_bad_request_closes_connection() {
    let (out, result, served) =
        exchange(b"POST / HTTP/1.1\r\n\r\nGET /a.txt HTTP/1.1\r\n\r\n").await;

    assert!(result.is_ok());
    assert_eq!(served, 1);
    assert_eq!(out, "HTTP/1.1 400 BAD REQUEST\r\nContent-Length: 0\r\n\r\n");
}

#[tokio::test]
async fn test_request_terminated_by_close() {
    let (out, result, served) = exchange(b"GET /a.txt HTTP/1.1").await;

    assert!(result.is_ok());
    assert_eq!(served, 1);
    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(out.ends_with("alpha"));
}

#[tokio::test]
async fn test_immediate_close_is_clean() {
    let (out, result, served) = exchange(b"").await;

    assert!(result.is_ok());
    assert_eq!(served, 0);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_oversized_request_rejected() {
    let mut request = b"GET /".to_vec();
    request.extend(std::iter::repeat_n(b'a', 512));
    request.extend_from_slice(b" HTTP/1.1\r\n\r\n");

    let (out, result, served) = exchange(&request).await;

    assert!(result.is_ok());
    assert_eq!(served, 1);
    assert!(out.starts_with("HTTP/1.1 400 BAD REQUEST\r\n"));
}

#[tokio::test]
async fn test_timeout_before_request_is_error() {
    let (mut client, handle) = spawn_connection(settings());

    client.write_all(b"GET /a.txt HTT").await.unwrap();

    let (result, served) = handle.await.unwrap();
    assert!(result.is_err());
    assert_eq!(served, 0);

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_idle_timeout_after_response_is_clean() {
    let (mut client, handle) = spawn_connection(settings());

    client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();

    // Connection stays open for more requests until it idles out.
    let (result, served) = handle.await.unwrap();
    assert!(result.is_ok());
    assert_eq!(served, 1);

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(String::from_utf8(out).unwrap().ends_with("home"));
}

#[tokio::test]
async fn test_trailing_blank_line_then_idle_is_clean() {
    let (mut client, handle) = spawn_connection(settings());

    client.write_all(b"GET / HTTP/1.1\r\n\r\n\r\n").await.unwrap();

    let (result, served) = handle.await.unwrap();
    assert!(result.is_ok(), "unexpected error: {:?}", result.err());
    assert_eq!(served, 1);

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(String::from_utf8(out).unwrap().ends_with("home"));
}

#[tokio::test]
async fn test_blank_lines_between_pipelined_requests_ignored() {
    let (out, result, served) =
        exchange(b"GET /a.txt HTTP/1.1\r\n\r\n\r\n\r\nGET / HTTP/1.1\r\n\r\n").await;

    assert!(result.is_ok());
    assert_eq!(served, 2);
    assert!(!out.contains("400 BAD REQUEST"));
    assert!(out.ends_with("home"));
}

#[tokio::test]
async fn test_request_buffer_never_exceeds_limit() {
    let limits = ConnectionSettings {
        read_timeout: Duration::from_millis(200),
        max_read_size: 16,
        max_request_size: 20,
    };

    // 20 bytes: fits exactly.
    let (mut client, handle) = spawn_connection(limits);
    client.write_all(b"GET /ab HTTP/1.1\r\n\r\n").await.unwrap();
    client.shutdown().await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(handle.await.unwrap().0.is_ok());
    assert!(String::from_utf8(out).unwrap().starts_with("HTTP/1.1 404 NOT FOUND\r\n"));

    // 22 bytes: the terminator lies past the limit, so it is never buffered.
    let (mut client, handle) = spawn_connection(limits);
    client.write_all(b"GET /abcd HTTP/1.1\r\n\r\n").await.unwrap();
    client.shutdown().await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(handle.await.unwrap().0.is_ok());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.1 400 BAD REQUEST\r\nContent-Length: 0\r\n\r\n"
    );
}
