//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! Chains hold handlers of *different* concrete types in one list, and the
//! router stores them in one tree per method. Rust collections hold a single
//! concrete type, so every handler is erased behind `Arc<dyn Handler>`:
//!
//! ```text
//! fn hello(w: &mut dyn ResponseWriter, req: &Request) { … }  ← user writes this
//!        ↓ handler_fn(hello)
//! HandlerFn(hello)                                          ← implements Handler
//!        ↓ .boxed()
//! Arc<dyn Handler>  (BoxedHandler)                          ← shared, cloneable
//!        ↓ chain / router / recover
//! handler.serve(w, req) at request time                     ← one vtable call
//! ```
//!
//! `Arc<H>` is itself a [`Handler`], so a [`BoxedHandler`] can be passed
//! anywhere a handler is expected, including to a chain transform.
//!
//! Handlers are synchronous. A request runs its whole chain to completion on
//! one thread; the server moves that work off the async reactor.

use std::sync::Arc;

use tracing::trace;

use crate::request::Request;
use crate::writer::ResponseWriter;

/// Something that produces a response on a [`ResponseWriter`].
///
/// Implement it on your own types for stateful middleware, or use
/// [`handler_fn`] for plain functions and closures.
pub trait Handler: Send + Sync + 'static {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request);

    /// Erases the concrete type.
    fn boxed(self) -> BoxedHandler
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

/// A heap-allocated, type-erased handler shared across chains and requests.
pub type BoxedHandler = Arc<dyn Handler>;

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        (**self).serve(w, req);
    }
}

// ── Function adapter ──────────────────────────────────────────────────────────

/// Wraps a function or closure so it can be used as a [`Handler`].
///
/// ```rust
/// use wrapchain::{handler_fn, Handler, Request, ResponseWriter};
///
/// fn hello(w: &mut dyn ResponseWriter, _req: &Request) {
///     w.write_text("hello");
/// }
///
/// let h = handler_fn(hello).boxed();
/// let greeting = handler_fn(|w, _req| {
///     w.write_text("hi");
/// });
/// # let _ = (h, greeting);
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
{
    HandlerFn(f)
}

/// See [`handler_fn`].
#[derive(Clone, Copy)]
pub struct HandlerFn<F>(F);

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut dyn ResponseWriter, &Request) + Send + Sync + 'static,
{
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        (self.0)(w, req);
    }
}

// ── NoOp ──────────────────────────────────────────────────────────────────────

/// The handler that does nothing. An empty chain serves as this.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOp;

impl Handler for NoOp {
    fn serve(&self, _w: &mut dyn ResponseWriter, _req: &Request) {
        trace!("noop");
    }
}
