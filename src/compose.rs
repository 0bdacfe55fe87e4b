//! Composing handlers into chains.
//!
//! Two topologies are supported. Given handlers `A, B, C` and a transform
//! `R` (typically [`recover`](crate::recover)):
//!
//! ```text
//! Chain      A → B → C                    one shared writer, no boundaries
//! ChainWrap  R(A) → R(B → C)              R once for the head,
//!                                         once for the whole tail
//! ```
//!
//! With `ChainWrap` a panic in `B` is caught by the tail's boundary: `A`'s
//! output survives, but `C` does not run. Use [`Chain`] of individually
//! wrapped links if every link needs its own boundary.
//!
//! Neither composer buffers. Wrap the composite in
//! [`buffered`](crate::buffered) to get that.

use std::fmt;

use tracing::trace;

use crate::handler::{BoxedHandler, Handler, NoOp};
use crate::request::Request;
use crate::writer::ResponseWriter;

// ── Chain ─────────────────────────────────────────────────────────────────────

/// Handlers run in order against the same writer and request.
pub enum Chain {
    Empty,
    Link { head: BoxedHandler, next: Box<Chain> },
}

impl Chain {
    pub fn new(handlers: impl IntoIterator<Item = BoxedHandler>) -> Self {
        let handlers: Vec<_> = handlers.into_iter().collect();
        Self::build(&handlers)
    }

    fn build(handlers: &[BoxedHandler]) -> Self {
        match handlers {
            [] => Self::Empty,
            [head, rest @ ..] => Self::Link { head: head.clone(), next: Box::new(Self::build(rest)) },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Link { next, .. } => 1 + next.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl Handler for Chain {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        match self {
            Self::Empty => NoOp.serve(w, req),
            Self::Link { head, next } => {
                trace!(last = next.is_empty(), "chain link");
                head.serve(w, req);
                next.serve(w, req);
            }
        }
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("len", &self.len()).finish()
    }
}

// ── ChainWrap ─────────────────────────────────────────────────────────────────

/// A transform applied to the head handler and, separately, to the
/// sequential composite of everything after it.
pub struct ChainWrap {
    head: Option<BoxedHandler>,
    tail: Option<BoxedHandler>,
}

impl ChainWrap {
    /// The transform runs here, at composition time: once for the head and,
    /// when there is more than one handler, once for the tail chain.
    pub fn new<T, W>(transform: T, handlers: impl IntoIterator<Item = BoxedHandler>) -> Self
    where
        T: Fn(BoxedHandler) -> W,
        W: Handler,
    {
        let handlers: Vec<_> = handlers.into_iter().collect();
        match handlers.as_slice() {
            [] => Self { head: None, tail: None },
            [head] => Self { head: Some(transform(head.clone()).boxed()), tail: None },
            [head, rest @ ..] => {
                let tail = Chain::build(rest).boxed();
                Self {
                    head: Some(transform(head.clone()).boxed()),
                    tail: Some(transform(tail).boxed()),
                }
            }
        }
    }
}

impl Handler for ChainWrap {
    fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) {
        let Some(head) = &self.head else {
            return NoOp.serve(w, req);
        };
        trace!(wrapped_tail = self.tail.is_some(), "chain wrap");
        head.serve(w, req);
        if let Some(tail) = &self.tail {
            tail.serve(w, req);
        }
    }
}

impl fmt::Debug for ChainWrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainWrap")
            .field("head", &self.head.is_some())
            .field("tail", &self.tail.is_some())
            .finish()
    }
}

// ── Macros ────────────────────────────────────────────────────────────────────

/// Builds a [`Chain`] from handlers of any type.
///
/// ```rust
/// use wrapchain::{chain, handler_fn, NoOp};
///
/// let c = chain![NoOp, handler_fn(|w, _| { w.write_text("A"); })];
/// assert_eq!(c.len(), 2);
/// ```
#[macro_export]
macro_rules! chain {
    ($($handler:expr),* $(,)?) => {
        $crate::Chain::new({
            let handlers: ::std::vec::Vec<$crate::BoxedHandler> =
                ::std::vec![$($crate::Handler::boxed($handler)),*];
            handlers
        })
    };
}

/// Builds a [`ChainWrap`]: `chain_wrap![transform; a, b, c]`.
#[macro_export]
macro_rules! chain_wrap {
    ($transform:expr; $($handler:expr),* $(,)?) => {
        $crate::ChainWrap::new($transform, {
            let handlers: ::std::vec::Vec<$crate::BoxedHandler> =
                ::std::vec![$($crate::Handler::boxed($handler)),*];
            handlers
        })
    };
}
