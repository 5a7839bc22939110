//! Request dumps for traffic logging.
//!
//! Renders a request in HTTP/1.x wire form. The body is buffered only when
//! its length is known up front and fits under the configured limit, and
//! is then handed back so the request can still be forwarded.

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::Request;
use http_body::Body as _;
use std::fmt::Write as _;

/// Reading the request body for the dump failed.
#[derive(Debug, thiserror::Error)]
#[error("failed to read request body: {0}")]
pub struct DumpError(#[from] axum::Error);

/// Dump `request`, returning it ready to forward.
///
/// On a read failure the request comes back with an empty body.
pub async fn dump_request(
    request: Request<Body>,
    limit: usize,
) -> (Request<Body>, Result<String, DumpError>) {
    let (parts, body) = request.into_parts();
    let size = body.size_hint().exact();

    match size {
        Some(len) if len as usize <= limit => match axum::body::to_bytes(body, limit).await {
            Ok(bytes) => {
                let dump = render(&parts, BodyNote::Bytes(&bytes));
                (Request::from_parts(parts, Body::from(bytes)), Ok(dump))
            }
            Err(e) => (Request::from_parts(parts, Body::empty()), Err(DumpError(e))),
        },
        Some(len) => {
            let dump = render(&parts, BodyNote::Oversized(len));
            (Request::from_parts(parts, body), Ok(dump))
        }
        None => {
            let dump = render(&parts, BodyNote::Streaming);
            (Request::from_parts(parts, body), Ok(dump))
        }
    }
}

enum BodyNote<'a> {
    Bytes(&'a Bytes),
    Oversized(u64),
    Streaming,
}

fn render(parts: &Parts, body: BodyNote<'_>) -> String {
    let target = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut out = String::new();
    let _ = write!(out, "{} {} {:?}\r\n", parts.method, target, parts.version);
    for (name, value) in &parts.headers {
        let _ = write!(out, "{}: {}\r\n", name, String::from_utf8_lossy(value.as_bytes()));
    }
    out.push_str("\r\n");

    match body {
        BodyNote::Bytes(bytes) => out.push_str(&String::from_utf8_lossy(bytes)),
        BodyNote::Oversized(len) => {
            let _ = write!(out, "[body not captured: {} bytes]", len);
        }
        BodyNote::Streaming => out.push_str("[body not captured: streamed]"),
    }
    out
}

/// Body that claims a length but fails on the first read.
#[cfg(test)]
pub(crate) struct BrokenBody(pub u64);

#[cfg(test)]
impl http_body::Body for BrokenBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: std::pin::Pin<&mut Self>,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        std::task::Poll::Ready(Some(Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ))))
    }

    fn size_hint(&self) -> http_body::SizeHint {
        http_body::SizeHint::with_exact(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_body_read_failure_yields_empty_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/x")
            .body(Body::new(BrokenBody(5)))
            .unwrap();

        let (request, dump) = dump_request(request, 1024).await;
        let err = dump.unwrap_err();
        assert!(err.to_string().starts_with("failed to read request body"), "{}", err);

        assert_eq!(request.method(), "POST");
        assert_eq!(request.uri().path(), "/x");
        let body = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_dump_includes_body_and_keeps_it() {
        let request = Request::builder()
            .method("POST")
            .uri("/submit?draft=1")
            .header("host", "proxy.local")
            .header("content-type", "application/json")
            .body(Body::from("{\"a\":true}"))
            .unwrap();

        let (request, dump) = dump_request(request, 1024).await;
        let dump = dump.unwrap();

        assert!(dump.starts_with("POST /submit?draft=1 HTTP/1.1\r\n"));
        assert!(dump.contains("host: proxy.local\r\n"));
        assert!(dump.contains("content-type: application/json\r\n"));
        assert!(dump.ends_with("\r\n\r\n{\"a\":true}"));

        let body = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"{\"a\":true}");
    }

    #[tokio::test]
    async fn test_oversized_body_is_not_buffered() {
        let request = Request::builder()
            .uri("/upload")
            .body(Body::from(vec![b'z'; 64]))
            .unwrap();

        let (request, dump) = dump_request(request, 16).await;
        assert!(dump.unwrap().ends_with("[body not captured: 64 bytes]"));

        let body = axum::body::to_bytes(request.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.len(), 64);
    }

    #[tokio::test]
    async fn test_empty_body() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (_, dump) = dump_request(request, 16).await;
        assert_eq!(dump.unwrap(), "GET / HTTP/1.1\r\n\r\n");
    }
}
