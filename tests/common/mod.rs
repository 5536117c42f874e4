//! Shared utilities for integration testing.
//!
//! Raw-TCP mock servers: backends the gateway proxies to, and a mock
//! discovery registry speaking the `GET /services/{name}` JSON protocol.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use edge_gateway::config::{GatewayConfig, RouteConfig};
use edge_gateway::http::GatewayServer;
use edge_gateway::lifecycle::Shutdown;

/// Build a config pointed at the given registry with the given routes
/// (service, path prefix, forward prefix). Metrics are disabled so tests
/// never contend for the global recorder.
pub fn gateway_config(registry: SocketAddr, routes: &[(&str, &str, &str)]) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.registry.url = format!("http://{}", registry);
    config.observability.metrics_enabled = false;
    for (service, path_prefix, forward_prefix) in routes {
        config.routes.push(RouteConfig {
            service: service.to_string(),
            path_prefix: path_prefix.to_string(),
            forward_prefix: forward_prefix.to_string(),
        });
    }
    config
}

/// Start a gateway on an ephemeral port. Returns its address and the
/// shutdown handle that tears it down.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = GatewayServer::new(config);
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// HTTP client without pooling, so every request observes the backend's
/// current state.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Bind an ephemeral port and release it, yielding an address that is very
/// likely to refuse connections until something binds it again.
pub async fn reserve_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Read one HTTP request (head plus content-length body) off the socket.
/// Returns the request line, e.g. "POST /login HTTP/1.1".
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        match socket.read(&mut chunk).await {
            Ok(0) => return String::new(),
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            }
            Err(_) => return String::new(),
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length: usize = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(_) => break,
        }
    }

    head.lines().next().unwrap_or_default().to_string()
}

async fn write_response(socket: &mut TcpStream, status_line: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Start a backend that answers 200 with "{METHOD} {PATH}" as the body,
/// so tests can assert what the gateway actually forwarded.
pub async fn start_echo_backend(addr: SocketAddr) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let request_line = read_request(&mut socket).await;
                        let echoed = request_line
                            .rsplit_once(' ')
                            .map(|(method_and_path, _)| method_and_path.to_string())
                            .unwrap_or(request_line);
                        write_response(&mut socket, "200 OK", &echoed).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a backend that waits `delay` before answering, to trip the
/// gateway's upstream timeout.
#[allow(dead_code)]
pub async fn start_slow_backend(addr: SocketAddr, delay: Duration) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let _ = read_request(&mut socket).await;
                        tokio::time::sleep(delay).await;
                        write_response(&mut socket, "200 OK", "late").await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a backend that counts accepted connections and answers 200.
#[allow(dead_code)]
pub async fn start_counting_backend(addr: SocketAddr, connections: Arc<AtomicU32>) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    connections.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let _ = read_request(&mut socket).await;
                        write_response(&mut socket, "200 OK", "ok").await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a mock discovery registry.
///
/// Answers `GET /services/{name}` with the instances configured for that
/// name (empty list otherwise) and counts every lookup.
pub async fn start_mock_registry(
    addr: SocketAddr,
    services: HashMap<String, Vec<SocketAddr>>,
    lookups: Arc<AtomicU32>,
) {
    let listener = TcpListener::bind(addr).await.unwrap();
    let services = Arc::new(services);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let services = services.clone();
                    let lookups = lookups.clone();
                    tokio::spawn(async move {
                        let request_line = read_request(&mut socket).await;
                        let path = request_line.split(' ').nth(1).unwrap_or("");

                        let Some(name) = path.strip_prefix("/services/") else {
                            write_response(&mut socket, "404 Not Found", "").await;
                            return;
                        };
                        lookups.fetch_add(1, Ordering::SeqCst);

                        let instances: Vec<serde_json::Value> = services
                            .get(name)
                            .map(|addrs| {
                                addrs
                                    .iter()
                                    .map(|a| {
                                        serde_json::json!({
                                            "address": a.ip().to_string(),
                                            "port": a.port(),
                                        })
                                    })
                                    .collect()
                            })
                            .unwrap_or_default();

                        let body = serde_json::json!({
                            "service_name": name,
                            "instances": instances,
                        })
                        .to_string();

                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}
