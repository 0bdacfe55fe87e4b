//! The response-writer capability shared by real sinks and captures.
//!
//! Every handler in a chain writes through `&mut dyn ResponseWriter`. It does
//! not know, and must not care, whether the bytes go straight to the
//! [`Recorder`](crate::Recorder) that the server turns into a hyper response
//! or into a [`ResponseCapture`](crate::ResponseCapture) that holds them until
//! the chain is done.

use http::HeaderMap;
use http::header::{CONTENT_TYPE, HeaderValue};

/// A sink for one HTTP response.
///
/// The contract mirrors what a live HTTP connection allows:
///
/// - headers are mutated in place through [`headers_mut`](Self::headers_mut)
/// - the status line is written by [`write_status`](Self::write_status)
/// - body bytes are appended by [`write`](Self::write)
///
/// On a real sink the first status write commits the headers. A capture
/// defers all of that until it is flushed.
pub trait ResponseWriter {
    /// Mutable access to the response headers.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Sets the status code. `0` is reserved for "unset".
    fn write_status(&mut self, code: u16);

    /// Appends `buf` to the body and returns the number of bytes taken.
    fn write(&mut self, buf: &[u8]) -> usize;

    /// Appends UTF-8 text to the body.
    fn write_text(&mut self, text: &str) -> usize {
        self.write(text.as_bytes())
    }

    /// Replaces the `content-type` header.
    fn set_content_type(&mut self, content_type: ContentType) {
        self.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type.as_str()));
    }
}

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with
/// [`ResponseWriter::set_content_type`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain; charset=utf-8",
        }
    }
}
