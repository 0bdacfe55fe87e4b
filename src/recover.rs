//! Panic recovery middleware.
//!
//! [`recover`] wraps a handler in a `catch_unwind` boundary. A panic inside
//! it is turned into a [`Fault`], the fault is rendered as text, and that
//! text is appended to the writer. Whatever the handler wrote before it
//! panicked stays in place; there is no rollback. The client sees the
//! partial output followed by the fault.
//!
//! ```rust
//! use wrapchain::{handler_fn, recover, Handler, Request, ResponseCapture, ResponseWriter};
//!
//! let h = recover(handler_fn(|w, _req| {
//!     w.write_text("partial");
//!     panic!(":Failure");
//! }));
//!
//! let mut capture = ResponseCapture::new();
//! h.serve(&mut capture, &Request::get("/"));
//! assert_eq!(capture.body_string(), "partial:Failure");
//! ```
//!
//! The default panic hook still prints the panic to stderr. Install your own
//! hook if that is noise in production.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::{trace, warn};

use crate::handler::Handler;
use crate::request::Request;
use crate::writer::ResponseWriter;

/// A panic caught by a [`Recover`] boundary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Fault {
    message: String,
}

impl Fault {
    /// Extracts the message from a panic payload.
    ///
    /// `panic!("literal")` carries a `&'static str`, `panic!("{x}")` a
    /// `String`. Anything else (`std::panic::panic_any`) has no printable
    /// form.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast_ref::<&'static str>() {
                Some(s) => (*s).to_owned(),
                None => "non-string panic payload".to_owned(),
            },
        };
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Renders a fault as the bare panic message.
fn render_plain(fault: &Fault) -> String {
    fault.to_string()
}

/// Wraps `next` in a panic boundary that writes the panic message.
pub fn recover<H: Handler>(next: H) -> Recover<H> {
    Recover { next, render: render_plain }
}

/// Like [`recover`], with a custom rendering of the fault.
///
/// ```rust
/// use wrapchain::{recover_with, NoOp};
///
/// let h = recover_with(NoOp, |fault| format!(" >>>{fault}<<< "));
/// # let _ = h;
/// ```
pub fn recover_with<H: Handler>(next: H, render: fn(&Fault) -> String) -> Recover<H> {
    Recover { next, render }
}

/// See [`recover`].
pub struct Recover<H> {
    next: H,
    render: fn(&Fault) -> String,
}

impl<H: Handler> Recover<H> {
    /// Runs `next`, returning the fault instead of unwinding.
    pub fn try_serve(&self, w: &mut dyn ResponseWriter, req: &Request) -> Result<(), Fault> {
        panic::catch_unwind(AssertUnwindSafe(|| self.next.serve(w, req))).map_err(Fault::from_panic)
    }
}

impl<H: Handler> Handler for Recover<H> {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        trace!(path = req.path(), "recover enter");
        if let Err(fault) = self.try_serve(w, req) {
            warn!(path = req.path(), %fault, "recovered from handler panic");
            w.write_text(&(self.render)(&fault));
        }
        trace!(path = req.path(), "recover exit");
    }
}

impl<H> fmt::Debug for Recover<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recover").finish_non_exhaustive()
    }
}
