//! Buffered scopes.
//!
//! A [`CaptureScope`] puts a [`ResponseCapture`] between a handler and the
//! real sink for the duration of one call. When the scope ends the capture
//! is flushed onto the sink and its body buffer goes back to the
//! [`BufferSource`]. The flush lives in `Drop`, so it also happens while a
//! panic unwinds through the scope: the client gets whatever was written
//! before the panic, and a pooled buffer is never lost.
//!
//! [`buffered`] packages that as a handler:
//!
//! ```rust
//! use wrapchain::{buffered, chain, handler_fn, BufferSource, Handler, Recorder, Request};
//!
//! let h = buffered(
//!     chain![
//!         handler_fn(|w, _| { w.write_text("body first, "); }),
//!         handler_fn(|w, _| w.write_status(201)),
//!     ],
//!     BufferSource::Fresh,
//! );
//!
//! let mut rec = Recorder::new();
//! h.serve(&mut rec, &Request::get("/"));
//! assert_eq!(rec.status(), 201);
//! ```

use std::sync::Arc;

use tracing::{trace, trace_span};

use crate::capture::ResponseCapture;
use crate::handler::Handler;
use crate::pool::{BufferPool, BufferSource};
use crate::request::Request;
use crate::writer::ResponseWriter;

/// Guard that owns a capture and flushes it into `sink` on drop.
pub struct CaptureScope<'a> {
    sink: &'a mut dyn ResponseWriter,
    source: &'a BufferSource,
    capture: ResponseCapture,
}

impl<'a> CaptureScope<'a> {
    pub fn open(sink: &'a mut dyn ResponseWriter, source: &'a BufferSource) -> Self {
        let capture = ResponseCapture::with_buffer(source.acquire());
        trace!(pooled = source.is_pooled(), "capture scope open");
        Self { sink, source, capture }
    }

    /// The writer handlers inside the scope should use.
    pub fn capture(&mut self) -> &mut ResponseCapture {
        &mut self.capture
    }
}

impl Drop for CaptureScope<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            trace!("capture scope unwinding, flushing partial response");
        }
        self.capture.flush(&mut *self.sink);
        self.source.release(self.capture.take_buffer());
        trace!("capture scope closed");
    }
}

/// Runs `handler` inside a [`CaptureScope`] on every call.
pub fn buffered<H: Handler>(handler: H, source: BufferSource) -> Buffered<H> {
    Buffered { inner: handler, source }
}

/// [`buffered`] with a per-request allocation.
pub fn buffered_fresh<H: Handler>(handler: H) -> Buffered<H> {
    buffered(handler, BufferSource::Fresh)
}

/// [`buffered`] with buffers borrowed from `pool`.
pub fn buffered_pooled<H: Handler>(handler: H, pool: Arc<BufferPool>) -> Buffered<H> {
    buffered(handler, BufferSource::Pooled(pool))
}

/// See [`buffered`].
#[derive(Debug)]
pub struct Buffered<H> {
    inner: H,
    source: BufferSource,
}

impl<H> Buffered<H> {
    pub fn source(&self) -> &BufferSource {
        &self.source
    }
}

impl<H: Handler> Handler for Buffered<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        let _span = trace_span!("buffered", path = req.path()).entered();
        let mut scope = CaptureScope::open(w, &self.source);
        self.inner.serve(scope.capture(), req);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};

    use http::header::{CONTENT_TYPE, HeaderValue};

    use super::*;
    use crate::chain;
    use crate::handler::handler_fn;
    use crate::pool::PoolConfig;
    use crate::recorder::Recorder;
    use crate::recover::recover;
    use crate::writer::ContentType;

    fn pool() -> Arc<BufferPool> {
        Arc::new(BufferPool::new(PoolConfig { size: 4, alloc: 256 }))
    }

    #[test]
    fn untouched_scope_leaves_sink_uncommitted() {
        let h = buffered_fresh(crate::NoOp);
        let mut rec = Recorder::new();
        h.serve(&mut rec, &Request::get("/"));
        assert!(!rec.is_committed());
        assert!(rec.body().is_empty());
    }

    #[test]
    fn late_status_and_headers_win() {
        let h = buffered_fresh(chain![
            handler_fn(|w, _| {
                w.write_text("hello");
            }),
            handler_fn(|w, _| {
                w.set_content_type(ContentType::Text);
                w.write_status(202);
            }),
        ]);
        let mut rec = Recorder::new();
        h.serve(&mut rec, &Request::get("/"));

        assert_eq!(rec.status(), 202);
        assert_eq!(rec.headers()[CONTENT_TYPE], ContentType::Text.as_str());
        assert_eq!(rec.body_string(), "hello");
    }

    #[test]
    fn direct_writes_cannot_change_status_late() {
        let h = chain![
            handler_fn(|w, _| {
                w.write_text("hello");
            }),
            handler_fn(|w, _| w.write_status(202)),
        ];
        let mut rec = Recorder::new();
        h.serve(&mut rec, &Request::get("/"));
        assert_eq!(rec.status(), 200);
    }

    #[test]
    fn captured_headers_replace_sink_defaults() {
        let h = buffered_fresh(handler_fn(|w, _| {
            w.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/xml"));
        }));
        let mut rec = Recorder::new();
        rec.set_content_type(ContentType::Json);
        h.serve(&mut rec, &Request::get("/"));
        assert_eq!(rec.headers()[CONTENT_TYPE], "application/xml");
    }

    #[test]
    fn pooled_buffer_returns_after_flush() {
        let pool = pool();
        let h = buffered_pooled(
            handler_fn(|w, _| {
                w.write_text("pooled");
            }),
            Arc::clone(&pool),
        );

        let mut rec = Recorder::new();
        h.serve(&mut rec, &Request::get("/"));

        assert_eq!(rec.body_string(), "pooled");
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn pooled_buffer_returns_even_when_untouched() {
        let pool = pool();
        let h = buffered_pooled(crate::NoOp, Arc::clone(&pool));
        h.serve(&mut Recorder::new(), &Request::get("/"));
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn unrecovered_panic_still_flushes_and_releases() {
        let pool = pool();
        let h = buffered_pooled(
            handler_fn(|w, _| {
                w.write_text("before");
                panic!("unrecovered");
            }),
            Arc::clone(&pool),
        );

        let mut rec = Recorder::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            h.serve(&mut rec, &Request::get("/"));
        }));

        assert!(result.is_err());
        assert_eq!(rec.body_string(), "before");
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn recovered_panic_is_flushed_as_text() {
        let h = buffered_fresh(recover(handler_fn(|w, _| {
            w.write_text("Body Text");
            panic!(":Failure");
        })));
        let mut rec = Recorder::new();
        h.serve(&mut rec, &Request::get("/"));
        assert_eq!(rec.status(), 200);
        assert_eq!(rec.body_string(), "Body Text:Failure");
    }

    #[test]
    fn scope_exposes_capture() {
        let source = BufferSource::Fresh;
        let mut rec = Recorder::new();
        {
            let mut scope = CaptureScope::open(&mut rec, &source);
            scope.capture().write_status(204);
            assert_eq!(scope.capture().status(), 204);
        }
        assert_eq!(rec.status(), 204);
    }
}
