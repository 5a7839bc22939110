//! Response capture.
//!
//! A [`ResponseSink`] receives the status and every body chunk of a
//! response. [`TeeBody`] relays a body to the client unchanged while
//! writing each data frame into a sink, so capture never alters the bytes
//! on the wire.

use axum::body::{Body, Bytes};
use axum::http::{Response, StatusCode};
use http_body::{Body as _, Frame, SizeHint};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Anything that accepts a response's status and body writes.
pub trait ResponseSink: Send + 'static {
    fn write_status(&mut self, status: StatusCode);

    fn write_body(&mut self, chunk: &[u8]);

    /// Called exactly once, when the body ends (`complete = true`) or is
    /// abandoned by the client or fails mid-stream (`complete = false`).
    fn finish(&mut self, _complete: bool) {}
}

/// In-memory capture of one response.
///
/// Bytes beyond `limit` are counted but not stored.
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    status: StatusCode,
    body: Vec<u8>,
    limit: usize,
    overflow: usize,
}

impl CapturedResponse {
    pub fn new(limit: usize) -> Self {
        Self {
            status: StatusCode::OK,
            body: Vec::new(),
            limit,
            overflow: 0,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Number of body bytes that did not fit under the limit.
    pub fn overflow(&self) -> usize {
        self.overflow
    }

    pub fn body_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

impl ResponseSink for CapturedResponse {
    fn write_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write_body(&mut self, chunk: &[u8]) {
        let room = self.limit.saturating_sub(self.body.len());
        let take = room.min(chunk.len());
        self.body.extend_from_slice(&chunk[..take]);
        self.overflow += chunk.len() - take;
    }
}

/// Pass-through body that copies data frames into a sink.
pub struct TeeBody<S: ResponseSink> {
    inner: Body,
    sink: S,
    finished: bool,
}

impl<S: ResponseSink> TeeBody<S> {
    pub fn new(inner: Body, sink: S) -> Self {
        Self {
            inner,
            sink,
            finished: false,
        }
    }

    fn finish(&mut self, complete: bool) {
        if !self.finished {
            self.finished = true;
            self.sink.finish(complete);
        }
    }
}

impl<S: ResponseSink + Unpin> http_body::Body for TeeBody<S> {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = Pin::new(&mut this.inner).poll_frame(cx);

        match &polled {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.sink.write_body(data);
                }
            }
            Poll::Ready(Some(Err(_))) => this.finish(false),
            Poll::Ready(None) => this.finish(true),
            Poll::Pending => {}
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<S: ResponseSink> Drop for TeeBody<S> {
    fn drop(&mut self) {
        // An empty body may never be polled; it still counts as complete.
        let complete = self.inner.is_end_stream();
        self.finish(complete);
    }
}

/// Record the status into `sink` and route the body through it.
pub fn tee_response<S>(response: Response<Body>, mut sink: S) -> Response<Body>
where
    S: ResponseSink + Unpin,
{
    sink.write_status(response.status());
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, Body::new(TeeBody::new(body, sink)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Sink that publishes what it saw on finish.
    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Option<(CapturedResponse, bool)>>>);

    struct Recording {
        captured: CapturedResponse,
        out: Shared,
    }

    impl ResponseSink for Recording {
        fn write_status(&mut self, status: StatusCode) {
            self.captured.write_status(status);
        }
        fn write_body(&mut self, chunk: &[u8]) {
            self.captured.write_body(chunk);
        }
        fn finish(&mut self, complete: bool) {
            *self.out.0.lock().unwrap() = Some((self.captured.clone(), complete));
        }
    }

    #[test]
    fn test_captured_response_defaults_to_ok() {
        let captured = CapturedResponse::new(16);
        assert_eq!(captured.status(), StatusCode::OK);
        assert!(captured.body().is_empty());
    }

    #[test]
    fn test_captured_response_limit() {
        let mut captured = CapturedResponse::new(4);
        captured.write_body(b"abc");
        captured.write_body(b"defg");
        assert_eq!(captured.body(), b"abcd");
        assert_eq!(captured.overflow(), 3);
    }

    #[test]
    fn test_last_status_wins() {
        let mut captured = CapturedResponse::new(4);
        captured.write_status(StatusCode::CREATED);
        captured.write_status(StatusCode::NOT_FOUND);
        assert_eq!(captured.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tee_passes_bytes_through() {
        let out = Shared::default();
        let sink = Recording {
            captured: CapturedResponse::new(1024),
            out: out.clone(),
        };
        let response = Response::builder()
            .status(StatusCode::ACCEPTED)
            .body(Body::from("{\"x\":1}"))
            .unwrap();

        let teed = tee_response(response, sink);
        assert_eq!(teed.status(), StatusCode::ACCEPTED);
        let bytes = axum::body::to_bytes(teed.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"{\"x\":1}");

        let (captured, complete) = out.0.lock().unwrap().take().expect("sink finished");
        assert!(complete);
        assert_eq!(captured.status(), StatusCode::ACCEPTED);
        assert_eq!(captured.body(), b"{\"x\":1}");
    }

    #[test]
    fn test_finish_on_drop_of_empty_body() {
        let out = Shared::default();
        let sink = Recording {
            captured: CapturedResponse::new(1024),
            out: out.clone(),
        };
        drop(tee_response(Response::new(Body::empty()), sink));

        let (captured, complete) = out.0.lock().unwrap().take().expect("sink finished");
        assert!(complete);
        assert!(captured.body().is_empty());
    }

    #[test]
    fn test_unread_body_is_incomplete() {
        let out = Shared::default();
        let sink = Recording {
            captured: CapturedResponse::new(1024),
            out: out.clone(),
        };
        drop(tee_response(Response::new(Body::from("never read")), sink));

        let (_, complete) = out.0.lock().unwrap().take().expect("sink finished");
        assert!(!complete);
    }
}
