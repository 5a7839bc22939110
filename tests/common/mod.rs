//! Shared utilities for integration testing.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, Response, StatusCode},
    Router,
};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use cors_proxy::{HttpServer, ProxyConfig, Shutdown};

/// What the mock backend answers with.
#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub body: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: &'static str) -> Self {
        Self {
            status: 200,
            body,
            headers: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// A running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<Seen>>>,
}

impl MockBackend {
    /// Start a backend on an ephemeral port that always answers `reply`.
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(None));

        let (h, l) = (hits.clone(), last.clone());
        let app = Router::new().fallback(move |request: Request<Body>| {
            let (hits, last, reply) = (h.clone(), l.clone(), reply.clone());
            async move {
                let (parts, body) = request.into_parts();
                let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
                *last.lock().unwrap() = Some(Seen {
                    method: parts.method,
                    path_and_query: parts
                        .uri
                        .path_and_query()
                        .map(|pq| pq.to_string())
                        .unwrap_or_default(),
                    headers: parts.headers,
                    body: body.to_vec(),
                });
                hits.fetch_add(1, Ordering::SeqCst);

                tokio::time::sleep(reply.delay).await;

                let mut builder = Response::builder().status(StatusCode::from_u16(reply.status).unwrap());
                for (name, value) in &reply.headers {
                    builder = builder.header(*name, *value);
                }
                builder.body(Body::from(reply.body)).unwrap()
            }
        });

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, hits, last }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Seen {
        self.last.lock().unwrap().clone().expect("backend was not called")
    }
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Config for a proxy in front of `backend_url`.
pub fn proxy_config(backend_url: &str, origins: &[&str]) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.backend.url = backend_url.to_string();
    config.backend.timeout_secs = 5;
    config.backend.connect_timeout_secs = 1;
    config.cors.allowed_origins = origins.iter().map(|o| o.to_string()).collect();
    config
}

/// A running proxy; shuts down on drop.
pub struct RunningProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningProxy {
    pub async fn start(config: ProxyConfig) -> Self {
        let server = HttpServer::new(config).expect("valid config");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self { addr, shutdown }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// In-memory log sink for asserting on emitted records.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Wait until `needle` shows up, for records emitted after the client
    /// already has its response.
    pub async fn wait_for(&self, needle: &str) -> String {
        for _ in 0..50 {
            let contents = self.contents();
            if contents.contains(needle) {
                return contents;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.contents()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's log records into a buffer.
///
/// Works with the default current-thread `#[tokio::test]` runtime, where
/// the server tasks run on the test thread.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}
