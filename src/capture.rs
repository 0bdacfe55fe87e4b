//! In-memory response capture.
//!
//! A [`ResponseCapture`] stands in for the real sink while a handler chain
//! runs. Nothing it receives reaches the network until it is flushed (see
//! `flush.rs`), so a later link can still override headers or the status an
//! earlier link set.
//!
//! ```text
//! Idle ──(headers_mut / write_status / write)──▶ Dirty ──▶ Flushed
//!   │
//!   └──────────────(scope exits untouched)──────────────▶ Discarded
//! ```
//!
//! The only way back to `Idle` is [`ResponseCapture::reset`].

use std::borrow::Cow;

use bytes::BytesMut;
use http::HeaderMap;
use tracing::trace;

use crate::writer::ResponseWriter;

/// Buffers headers, status, and body for one response.
#[derive(Debug, Default)]
pub struct ResponseCapture {
    pub(crate) headers: HeaderMap,
    /// `0` means no handler set a status.
    pub(crate) status: u16,
    pub(crate) body: BytesMut,
    changed: bool,
}

impl ResponseCapture {
    /// A capture backed by a fresh, empty body buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// A capture that writes its body into `buffer`.
    ///
    /// The buffer is cleared first; whatever it held before is not part of
    /// the response.
    pub fn with_buffer(mut buffer: BytesMut) -> Self {
        buffer.clear();
        Self { headers: HeaderMap::new(), status: 0, body: buffer, changed: false }
    }

    /// Headers captured so far. Unlike [`ResponseWriter::headers_mut`] this
    /// does not mark the capture as changed.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The pending status code, `0` if none was set.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The captured body as text. Invalid UTF-8 is replaced, not rejected.
    pub fn body_string(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// `true` once any writer operation has been called, including
    /// [`headers_mut`](ResponseWriter::headers_mut).
    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// `true` when no status was set yet, or the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status == 0 || (200..300).contains(&self.status)
    }

    /// Returns the capture to `Idle`: empty body, unset status, no headers.
    ///
    /// The body buffer keeps its capacity.
    pub fn reset(&mut self) {
        trace!("capture reset");
        self.body.clear();
        self.status = 0;
        self.changed = false;
        self.headers = HeaderMap::new();
    }

    /// Gives up the body buffer, leaving an empty one behind.
    pub(crate) fn take_buffer(&mut self) -> BytesMut {
        std::mem::take(&mut self.body)
    }
}

impl ResponseWriter for ResponseCapture {
    /// Marks the capture as changed even if the caller only reads: callers
    /// that ask for the header map almost always go on to modify it, so the
    /// request for mutable access is treated as the modification.
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.changed = true;
        &mut self.headers
    }

    /// Last write wins. No range checks happen here; the real sink decides
    /// what an out-of-range code means.
    fn write_status(&mut self, code: u16) {
        self.changed = true;
        self.status = code;
    }

    fn write(&mut self, buf: &[u8]) -> usize {
        self.changed = true;
        self.body.extend_from_slice(buf);
        buf.len()
    }
}
