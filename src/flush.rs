//! Replaying a capture onto the real sink.
//!
//! Order matters. On a live sink the status write commits the headers, so
//! headers go first, then the status, then the body. A capture nobody wrote
//! to is not replayed at all; the sink is left exactly as it was.

use tracing::trace;

use crate::capture::ResponseCapture;
use crate::writer::ResponseWriter;

impl ResponseCapture {
    /// Replays headers, status, and body onto `sink` if the capture changed.
    pub fn flush(&self, sink: &mut dyn ResponseWriter) {
        if !self.has_changed() {
            trace!("capture untouched, nothing to flush");
            return;
        }
        self.flush_headers(sink);
        self.flush_status(sink);
        sink.write(&self.body);
        trace!(status = self.status, bytes = self.body.len(), "capture flushed");
    }

    /// Copies every captured header onto `sink`.
    ///
    /// Values under a captured name replace whatever the sink already holds
    /// for that name; names the capture never touched are left alone.
    pub fn flush_headers(&self, sink: &mut dyn ResponseWriter) {
        let target = sink.headers_mut();
        for name in self.headers.keys() {
            target.remove(name);
            for value in self.headers.get_all(name) {
                target.append(name.clone(), value.clone());
            }
        }
    }

    /// Writes the pending status to `sink`, unless none was set.
    pub fn flush_status(&self, sink: &mut dyn ResponseWriter) {
        if self.status != 0 {
            sink.write_status(self.status);
        }
    }
}

#[cfg(test)]
mod tests {
    use http::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderValue, SET_COOKIE};

    use crate::capture::ResponseCapture;
    use crate::recorder::Recorder;
    use crate::writer::{ContentType, ResponseWriter};

    #[test]
    fn untouched_capture_leaves_sink_alone() {
        let capture = ResponseCapture::new();
        let mut rec = Recorder::new();
        capture.flush(&mut rec);
        assert!(!rec.is_committed());
        assert!(rec.body().is_empty());
    }

    #[test]
    fn header_only_change_still_commits() {
        let mut capture = ResponseCapture::new();
        capture.set_content_type(ContentType::Html);

        let mut rec = Recorder::new();
        capture.flush(&mut rec);

        assert!(rec.is_committed());
        assert_eq!(rec.status(), 200);
        assert_eq!(rec.headers()[CONTENT_TYPE], ContentType::Html.as_str());
    }

    #[test]
    fn captured_values_replace_sink_values() {
        let mut rec = Recorder::new();
        rec.headers_mut().append(SET_COOKIE, HeaderValue::from_static("a=1"));
        rec.headers_mut().append(SET_COOKIE, HeaderValue::from_static("b=2"));
        rec.headers_mut().insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let mut capture = ResponseCapture::new();
        capture.headers_mut().append(SET_COOKIE, HeaderValue::from_static("c=3"));
        capture.headers_mut().append(SET_COOKIE, HeaderValue::from_static("d=4"));
        capture.flush(&mut rec);

        let cookies: Vec<_> = rec.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies, ["c=3", "d=4"]);
        assert_eq!(rec.headers()[CACHE_CONTROL], "no-store");
    }

    #[test]
    fn status_precedes_body() {
        let mut capture = ResponseCapture::new();
        capture.write(b"created");
        capture.write_status(201);

        let mut rec = Recorder::new();
        capture.flush(&mut rec);

        assert_eq!(rec.status(), 201);
        assert_eq!(rec.body_string(), "created");
    }

    #[test]
    fn unset_status_is_not_written() {
        let mut capture = ResponseCapture::new();
        capture.write(b"ok");

        let mut rec = Recorder::new();
        capture.flush(&mut rec);

        assert_eq!(rec.status(), 200);
    }

    #[test]
    fn headers_set_after_body_still_arrive() {
        let mut capture = ResponseCapture::new();
        capture.write(b"<p>late</p>");
        capture.set_content_type(ContentType::Html);

        let mut rec = Recorder::new();
        capture.flush(&mut rec);

        assert_eq!(rec.headers()[CONTENT_TYPE], ContentType::Html.as_str());
    }
}
