//! # wrapchain
//!
//! Buffered responses and composable handler chains for HTTP servers.
//!
//! ## The problem
//!
//! A live HTTP response is unforgiving. The first body byte commits a
//! `200 OK`; headers set after that are silently dropped; the status line is
//! written once. In a chain of handlers that means the *first* link to write
//! decides the status and headers for everyone after it.
//!
//! wrapchain puts a [`ResponseCapture`] between the chain and the real sink.
//! Every link writes into memory. Only when the chain has finished is the
//! capture replayed onto the sink (headers, then status, then body), so any
//! link can still override what an earlier one set. A capture nobody wrote to
//! is dropped without touching the sink.
//!
//! ## The pieces
//!
//! - [`ResponseWriter`]: the sink capability every handler writes through
//! - [`ResponseCapture`]: an in-memory writer, flushed with
//!   [`ResponseCapture::flush`]
//! - [`buffered`]: runs a handler inside a capture scope that flushes on every
//!   exit path, unwinding included
//! - [`BufferSource`] / [`BufferPool`]: fresh or pooled body storage
//! - [`Chain`] / [`chain!`]: links run in order on one writer
//! - [`ChainWrap`] / [`chain_wrap!`]: a transform around the head and around
//!   the rest
//! - [`recover`]: turns a panic into text appended to the response
//! - [`Router`] + [`Server`]: hyper-based host wiring
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wrapchain::{chain, chain_wrap, handler_fn, recover, Config, Request, ResponseWriter, Router, Server};
//!
//! fn a(w: &mut dyn ResponseWriter, _req: &Request) {
//!     w.write_text(" [A: Body Text] ");
//! }
//!
//! fn panicky(_w: &mut dyn ResponseWriter, _req: &Request) {
//!     panic!("going...");
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), wrapchain::Error> {
//!     let config = Config::from_env()?;
//!
//!     let app = Router::new()
//!         .get("/", config.buffered(chain![handler_fn(a), handler_fn(a)]))
//!         .get("/panicky", config.buffered(chain_wrap![recover; handler_fn(a), handler_fn(panicky)]));
//!
//!     Server::from_addr(config.listen_addr()?).serve(app).await
//! }
//! ```

mod capture;
mod compose;
mod config;
mod error;
mod flush;
mod handler;
mod pool;
mod recorder;
mod recover;
mod request;
mod router;
mod scope;
mod server;
mod writer;

pub use capture::ResponseCapture;
pub use compose::{Chain, ChainWrap};
pub use config::{BufferStrategy, Config};
pub use error::Error;
pub use handler::{BoxedHandler, Handler, HandlerFn, NoOp, handler_fn};
pub use pool::{BufferPool, BufferSource, PoolConfig};
pub use recorder::Recorder;
pub use recover::{Fault, Recover, recover, recover_with};
pub use request::Request;
pub use router::Router;
pub use scope::{Buffered, CaptureScope, buffered, buffered_fresh, buffered_pooled};
pub use server::Server;
pub use writer::{ContentType, ResponseWriter};
