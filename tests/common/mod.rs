//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use product_composite::config::{BackendConfig, CompositeConfig};
use product_composite::lifecycle::{self, App, Shutdown};
use product_composite::HttpServer;

/// Start a backend that answers every request from `f(path)`.
///
/// Returns the bound address (ephemeral port).
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let _ = serve_one(socket, f.as_ref()).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a healthy backend that serves `{"status":"UP"}` on its health path
/// and `body` everywhere else.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move |path| async move {
        if path.starts_with("/actuator/health") {
            (200, r#"{"status":"UP"}"#.to_string())
        } else {
            (200, body.to_string())
        }
    })
    .await
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn serve_one<F, Fut>(mut socket: TcpStream, f: &F) -> std::io::Result<()>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = (u16, String)>,
{
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let (status, body) = f(path).await;
    let status_text = match status {
        200 => "200 OK",
        404 => "404 Not Found",
        422 => "422 Unprocessable Entity",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

/// Default config pointed at the given backends, with short timeouts.
pub fn config_for(product: SocketAddr, recommendation: SocketAddr, review: SocketAddr) -> CompositeConfig {
    let mut config = CompositeConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.backends.product = BackendConfig::new(format!("http://{product}"));
    config.backends.recommendation = BackendConfig::new(format!("http://{recommendation}"));
    config.backends.review = BackendConfig::new(format!("http://{review}"));
    config.health.probe_timeout_ms = 500;
    config.timeouts.connect_secs = 1;
    config.timeouts.backend_secs = 5;
    config.observability.metrics_enabled = false;
    config
}

/// A running composite service.
pub struct Running {
    pub addr: SocketAddr,
    pub app: App,
    pub shutdown: Shutdown,
}

impl Running {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Build and serve the composite service on an ephemeral port.
pub async fn start_composite(config: CompositeConfig) -> Running {
    let app = lifecycle::build(config).unwrap();
    let listener = TcpListener::bind(&app.config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&app);
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    Running { addr, app, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
