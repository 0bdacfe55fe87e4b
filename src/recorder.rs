//! The real response sink.
//!
//! A [`Recorder`] behaves the way a live HTTP connection does, and the server
//! turns it into the hyper response once the handler returns:
//!
//! - the status line is written at most once; a second attempt is ignored
//! - the first body write commits an implicit `200 OK`
//! - headers are frozen at commit time; later edits to the map do not reach
//!   the client
//!
//! Those rules are the reason [`ResponseCapture`](crate::ResponseCapture)
//! exists: a handler late in a chain cannot change the status or headers once
//! an earlier one wrote body bytes directly to a `Recorder`.

use std::borrow::Cow;

use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use http_body_util::Full;
use tracing::warn;

use crate::writer::ResponseWriter;

/// An outgoing response that enforces live-connection write semantics.
#[derive(Debug, Default)]
pub struct Recorder {
    headers: HeaderMap,
    /// Headers as they were when the status line was committed.
    committed: Option<HeaderMap>,
    status: Option<u16>,
    body: BytesMut,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed status, or `200` if nothing has been committed yet.
    pub fn status(&self) -> u16 {
        self.status.unwrap_or(200)
    }

    /// `true` once a status was written, explicitly or by a body write.
    pub fn is_committed(&self) -> bool {
        self.status.is_some()
    }

    /// Headers the client would see: the snapshot taken at commit, or the
    /// live map if nothing has been committed.
    pub fn headers(&self) -> &HeaderMap {
        self.committed.as_ref().unwrap_or(&self.headers)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_string(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Converts into the response hyper sends on the wire.
    ///
    /// Codes `http` cannot represent become `500 Internal Server Error`.
    pub fn into_response(self) -> http::Response<Full<Bytes>> {
        let code = self.status();
        let status = StatusCode::from_u16(code).unwrap_or_else(|_| {
            warn!(code, "invalid status code, sending 500");
            StatusCode::INTERNAL_SERVER_ERROR
        });
        let headers = self.committed.unwrap_or(self.headers);

        let mut response = http::Response::new(Full::new(self.body.freeze()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }

    fn commit(&mut self, code: u16) {
        self.status = Some(code);
        self.committed = Some(self.headers.clone());
    }
}

impl ResponseWriter for Recorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, code: u16) {
        if code == 0 {
            warn!("write_status(0) ignored, 0 means unset");
            return;
        }
        if let Some(current) = self.status {
            warn!(current, ignored = code, "superfluous write_status call");
            return;
        }
        self.commit(code);
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        if self.status.is_none() {
            self.commit(200);
        }
        self.body.extend_from_slice(buf);
        buf.len()
    }
}

#[cfg(test)]
mod tests {
    use http::header::{CONTENT_TYPE, HeaderValue, LOCATION};

    use super::*;
    use crate::writer::ContentType;

    #[test]
    fn untouched_recorder_defaults_to_200() {
        let rec = Recorder::new();
        assert!(!rec.is_committed());
        assert_eq!(rec.status(), 200);
        assert!(rec.body().is_empty());
    }

    #[test]
    fn first_write_commits_implicit_200() {
        let mut rec = Recorder::new();
        rec.write(b"hello");
        assert!(rec.is_committed());
        assert_eq!(rec.status(), 200);

        rec.write_status(500);
        assert_eq!(rec.status(), 200);
    }

    #[test]
    fn status_is_written_once() {
        let mut rec = Recorder::new();
        rec.write_status(201);
        rec.write_status(404);
        assert_eq!(rec.status(), 201);
    }

    #[test]
    fn headers_after_commit_are_not_sent() {
        let mut rec = Recorder::new();
        rec.set_content_type(ContentType::Text);
        rec.write_status(201);
        rec.headers_mut().insert(LOCATION, HeaderValue::from_static("/users/99"));

        assert!(rec.headers().get(LOCATION).is_none());
        assert_eq!(rec.headers()[CONTENT_TYPE], ContentType::Text.as_str());

        let response = rec.into_response();
        assert!(response.headers().get(LOCATION).is_none());
    }

    #[test]
    fn into_response_carries_status_headers_and_body() {
        let mut rec = Recorder::new();
        rec.set_content_type(ContentType::Json);
        rec.write_status(202);
        rec.write_text(r#"{"id":1}"#);

        let response = rec.into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn unrepresentable_status_becomes_500() {
        let mut rec = Recorder::new();
        rec.write_status(42);
        assert_eq!(rec.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn zero_status_is_not_committed() {
        let mut rec = Recorder::new();
        rec.write_status(0);
        assert!(!rec.is_committed());

        rec.write_status(204);
        assert_eq!(rec.into_response().status(), StatusCode::NO_CONTENT);
    }
}
