use std::sync::Arc;

use fileserve::config::{ServerConfig, StaticFilesConfig};
use fileserve::http::connection::ConnectionSettings;
use fileserve::http::dispatch::Dispatcher;
use fileserve::server::listener::{bind, serve};
use fileserve::store::MemoryStore;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn start_server() -> std::net::SocketAddr {
    let cfg = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        ..ServerConfig::default()
    };
    let listener = bind(&cfg).unwrap();
    let addr = listener.local_addr().unwrap();

    let store = MemoryStore::new()
        .with_file("/index.html", "<h1>it works</h1>")
        .with_file("/404pic.png", vec![0x89u8, b'P', b'N', b'G']);
    let dispatcher = Arc::new(Dispatcher::new(store, &StaticFilesConfig::default()));

    tokio::spawn(serve(listener, dispatcher, ConnectionSettings::from(&cfg)));
    addr
}

async fn request(addr: std::net::SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    out
}

#[tokio::test]
async fn test_serves_default_page_over_tcp() {
    let addr = start_server().await;

    let out = request(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "HTTP/1.1 200 OK\r\nContent-Type: text/html;charset=utf-8\r\nContent-Length: 17\r\n\r\n<h1>it works</h1>"
    );
}

#[tokio::test]
async fn test_not_found_over_tcp() {
    let addr = start_server().await;

    let out = request(addr, b"GET /missing.html HTTP/1.1\r\n\r\n").await;

    let mut expected =
        b"HTTP/1.1 404 NOT FOUND\r\nContent-Type: image/png\r\nContent-Length: 4\r\n\r\n".to_vec();
    expected.extend_from_slice(&[0x89, b'P', b'N', b'G']);
    assert_eq!(out, expected);
}

#[tokio::test]
async fn test_server_survives_bad_clients() {
    let addr = start_server().await;

    let bad = request(addr, b"Get Falafel\r\n\r\n").await;
    assert_eq!(bad, b"HTTP/1.1 400 BAD REQUEST\r\nContent-Length: 0\r\n\r\n".to_vec());

    let forbidden = request(addr, b"GET /forbidden HTTP/1.1\r\n\r\n").await;
    assert_eq!(
        forbidden,
        b"HTTP/1.1 403 FORBIDDEN\r\nContent-Length: 0\r\n\r\n".to_vec()
    );
}

#[tokio::test]
async fn test_bind_rejects_invalid_address() {
    let cfg = ServerConfig {
        listen_addr: "not an address".to_string(),
        ..ServerConfig::default()
    };

    let err = bind(&cfg).unwrap_err();
    assert!(err.to_string().contains("invalid listen address"));
}
