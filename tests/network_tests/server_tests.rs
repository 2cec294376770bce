//! Tests for the network layer
//!
//! These tests verify:
//! - Full request/response exchanges over TCP
//! - One request per connection, then close
//! - Pooled slots come back after every connection, including failures
//! - Graceful shutdown of the accept loop

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use wayfarer::engine::{Engine, EngineConfig};
use wayfarer::network::{RequestPool, Server, ShutdownHandle};
use wayfarer::{Config, Router, WayfarerError};

// =============================================================================
// Helper Functions
// =============================================================================

const POOL_SIZE: usize = 4;

struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    pool: Arc<RequestPool>,
    task: JoinHandle<wayfarer::Result<()>>,
}

async fn start_server() -> TestServer {
    let engine = Arc::new(Engine::new(EngineConfig::uniform(100, 1_500_000_000)));
    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .server_name("wayfarer-test")
        .pool_size(POOL_SIZE)
        .buffer_size(4096)
        .read_timeout_ms(2000)
        .write_timeout_ms(2000)
        .build();
    let server = Server::new(config, Arc::new(Router::new(engine)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = server.shutdown_handle();
    let pool = Arc::clone(server.pool());
    let task = tokio::spawn(async move { server.serve(listener).await });

    TestServer {
        addr,
        shutdown,
        pool,
        task,
    }
}

/// Send raw bytes and read until the server closes the connection
async fn exchange(addr: SocketAddr, raw: &[u8]) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let text = String::from_utf8(response).unwrap();

    let status = text[9..12].parse().unwrap();
    let body = text.split_once("\r\n\r\n").unwrap().1.to_string();
    (status, body)
}

async fn get(addr: SocketAddr, target: &str) -> (u16, String) {
    let raw = format!("GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", target);
    exchange(addr, raw.as_bytes()).await
}

async fn post(addr: SocketAddr, target: &str, body: &str) -> (u16, String) {
    let raw = format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{}",
        target,
        body.len(),
        body
    );
    exchange(addr, raw.as_bytes()).await
}

/// Wait for every connection task to hand its slot back
async fn wait_for_idle_pool(pool: &RequestPool) {
    for _ in 0..200 {
        if pool.available() == pool.capacity() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "pool did not drain: {} of {} slots idle",
        pool.available(),
        pool.capacity()
    );
}

// =============================================================================
// Exchange Tests
// =============================================================================

#[tokio::test]
async fn test_create_and_fetch_over_tcp() {
    let server = start_server().await;

    let (status, body) = post(
        server.addr,
        "/locations/new",
        r#"{"id":1,"place":"P","country":"C","city":"Ct","distance":10}"#,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, "{}");

    let (status, body) = get(server.addr, "/locations/1").await;
    assert_eq!(status, 200);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["place"], "P");
    assert_eq!(value["distance"], 10);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_response_headers() {
    let server = start_server().await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream
        .write_all(b"GET /users/1 HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();

    let expected = "HTTP/1.1 404 Not Found\r\n\
                    Content-Type: application/json; charset=utf-8\r\n\
                    Server: wayfarer-test\r\n\
                    Content-Length: 0\r\n\r\n";
    assert_eq!(String::from_utf8(response).unwrap(), expected);

    server.shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_request_returns_slot() {
    let server = start_server().await;

    let (status, body) = post(server.addr, "/users/new", "{oops").await;
    assert_eq!(status, 400);
    assert!(body.is_empty());

    let (status, _) = exchange(server.addr, b"xy").await;
    assert_eq!(status, 400);

    wait_for_idle_pool(&server.pool).await;
    server.shutdown.trigger();
}

#[tokio::test]
async fn test_client_closing_early_does_not_stop_server() {
    let server = start_server().await;

    let stream = TcpStream::connect(server.addr).await.unwrap();
    drop(stream);

    let (status, _) = get(server.addr, "/visits/1").await;
    assert_eq!(status, 404);

    wait_for_idle_pool(&server.pool).await;
    server.shutdown.trigger();
}

#[tokio::test]
async fn test_more_clients_than_pool_slots() {
    let server = start_server().await;
    post(
        server.addr,
        "/locations/new",
        r#"{"id":1,"place":"P","country":"C","city":"Ct","distance":10}"#,
    )
    .await;

    let mut clients = Vec::new();
    for _ in 0..(POOL_SIZE * 4) {
        let addr = server.addr;
        clients.push(tokio::spawn(async move { get(addr, "/locations/1/avg").await }));
    }
    for client in clients {
        let (status, body) = client.await.unwrap();
        assert_eq!(status, 200);
        assert_eq!(body, "{\"avg\":0.00000}");
    }

    wait_for_idle_pool(&server.pool).await;
    assert!(server.pool.allocated() >= POOL_SIZE);
    server.shutdown.trigger();
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_shutdown_stops_accept_loop() {
    let server = start_server().await;

    server.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server.task)
        .await
        .unwrap()
        .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_run_rejects_invalid_config() {
    let engine = Arc::new(Engine::new(EngineConfig::uniform(1, 0)));
    let config = Config::builder()
        .listen_addr("127.0.0.1:0")
        .buffer_size(16)
        .build();
    let server = Server::new(config, Arc::new(Router::new(engine)));

    let result = server.run().await;

    assert!(matches!(result, Err(WayfarerError::Config(_))));
}

#[test]
fn test_config_validation() {
    assert!(Config::default().validate().is_ok());
    assert!(Config::builder().pool_size(0).build().validate().is_err());
    assert!(Config::builder().listen_addr("").build().validate().is_err());
    assert!(Config::builder()
        .server_name("evil\r\nX-Injected: 1")
        .build()
        .validate()
        .is_err());
}

// =============================================================================
// Request Pool Tests
// =============================================================================

#[test]
fn test_pool_checkout_and_return() {
    let pool = RequestPool::new(2, 128);
    assert_eq!(pool.available(), 2);

    let mut slot = pool.checkout();
    assert_eq!(pool.available(), 1);
    assert_eq!(slot.buffer_len(), 128);

    let (_, response) = slot.split();
    response.extend_from_slice(b"leftover");
    drop(slot);

    assert_eq!(pool.available(), 2);
    let slot = pool.checkout();
    assert!(slot.response().is_empty());
}

#[test]
fn test_pool_overflow_allocates_and_discards() {
    let pool = RequestPool::new(1, 64);

    let first = pool.checkout();
    let second = pool.checkout();
    assert_eq!(pool.allocated(), 2);
    assert_eq!(pool.available(), 0);

    drop(first);
    drop(second);

    assert_eq!(pool.available(), 1);
    assert_eq!(pool.capacity(), 1);
}
