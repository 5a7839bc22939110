//! Traffic logging middleware.
//!
//! Logs the full inbound request before the inner handler runs, and the
//! status and body of the response once the body has been relayed to the
//! client. Logging never changes what the client receives.

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::config::LoggingConfig;
use crate::http::request::request_id;
use crate::observability::capture::{tee_response, CapturedResponse, ResponseSink};
use crate::observability::dump::dump_request;

/// Traffic logger settings.
#[derive(Debug, Clone, Copy)]
pub struct TrafficLog {
    pub max_body_bytes: usize,
}

impl TrafficLog {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            max_body_bytes: config.max_body_bytes,
        }
    }
}

pub async fn traffic_log(
    State(settings): State<TrafficLog>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let request_id = request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (request, dump) = dump_request(request, settings.max_body_bytes).await;
    match dump {
        Ok(dump) => tracing::info!(request_id = %request_id, request = ?dump, "Incoming request"),
        Err(e) => tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            error = %e,
            "Failed to dump request"
        ),
    }

    let response = next.run(request).await;

    tee_response(
        response,
        ResponseLog {
            captured: CapturedResponse::new(settings.max_body_bytes),
            request_id,
            method,
            path,
        },
    )
}

/// Capture sink that writes the response record when the body finishes.
struct ResponseLog {
    captured: CapturedResponse,
    request_id: String,
    method: Method,
    path: String,
}

impl ResponseSink for ResponseLog {
    fn write_status(&mut self, status: StatusCode) {
        self.captured.write_status(status);
    }

    fn write_body(&mut self, chunk: &[u8]) {
        self.captured.write_body(chunk);
    }

    fn finish(&mut self, complete: bool) {
        tracing::info!(
            request_id = %self.request_id,
            method = %self.method,
            path = %self.path,
            status = self.captured.status().as_u16(),
            body = ?self.captured.body_lossy(),
            truncated_bytes = self.captured.overflow(),
            complete,
            "Outgoing response"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::dump::BrokenBody;
    use crate::observability::logging::testing::capture_logs;
    use axum::{body::Bytes, middleware::from_fn_with_state, Router};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_dump_failure_still_runs_handler() {
        let (logs, _guard) = capture_logs();

        let seen: Arc<Mutex<Option<Bytes>>> = Arc::default();
        let recorder = seen.clone();
        let app = Router::new()
            .fallback(move |body: Bytes| {
                let recorder = recorder.clone();
                async move {
                    *recorder.lock().unwrap() = Some(body);
                    "done"
                }
            })
            .layer(from_fn_with_state(TrafficLog { max_body_bytes: 1024 }, traffic_log));

        let request = Request::builder()
            .method("POST")
            .uri("/x")
            .body(Body::new(BrokenBody(5)))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"done");

        assert_eq!(seen.lock().unwrap().as_deref(), Some(&b""[..]));

        let contents = logs.contents();
        let line = contents
            .lines()
            .find(|l| l.contains("Failed to dump request"))
            .expect("dump failure record");
        assert!(line.contains("ERROR"), "{}", line);
        assert!(line.contains("method=POST"), "{}", line);
        assert!(line.contains("path=/x"), "{}", line);
        assert!(contents.contains("Outgoing response"));
    }
}
