//! wrapchain demo: buffered chains, a panicking link, and recovery.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!   WRAP_BUFFER_HANDLER=pool PORT=3000 cargo run --example basic
//!
//! Try:
//!   curl http://localhost:8080/         # time + A + B + A
//!   curl http://localhost:8080/panic    # same, then a recovered panic
//!   curl http://localhost:8080/panicky  # recover(time) then recover(A → panicky → B → A)

use chrono::Utc;
use tracing::info;
use wrapchain::{
    chain, chain_wrap, handler_fn, recover, recover_with, Config, Fault, Request, ResponseWriter,
    Router, Server,
};

const TIME_FORMAT: &str = "%Y.%m.%d.%H.%M.%S%.3f.%z.UTC";

#[tokio::main]
async fn main() -> Result<(), wrapchain::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    info!(strategy = ?config.strategy, addr = %config.listen_addr()?, "starting demo");

    // One source for every route, so a pooled config shares a single pool.
    let source = config.buffer_source();

    let handler = chain![handler_fn(time), handler_fn(a), handler_fn(b), handler_fn(a)];
    // Panics in the last link; the recovered message follows the earlier output.
    let handler_panic = chain![
        handler_fn(time),
        handler_fn(a),
        handler_fn(b),
        handler_fn(a),
        recover_with(handler_fn(panicky), arrows),
    ];
    // Recovers, but B and A never run: they share the tail's boundary.
    let handler_panicky = chain_wrap![
        |h| recover_with(h, arrows);
        handler_fn(time), handler_fn(a), handler_fn(panicky), handler_fn(b), handler_fn(a),
    ];

    let app = Router::new()
        .get("/", wrapchain::buffered(handler, source.clone()))
        .get("/panic", wrapchain::buffered(handler_panic, source.clone()))
        .get("/panicky", wrapchain::buffered(handler_panicky, source.clone()))
        .get("/plain", recover(handler_fn(a)));

    Server::from_addr(config.listen_addr()?).serve(app).await
}

fn arrows(fault: &Fault) -> String {
    format!(" >>>{fault}<<< ")
}

fn time(w: &mut dyn ResponseWriter, _req: &Request) {
    let now = Utc::now().format(TIME_FORMAT);
    info!(%now, "time link");
    w.write_text(&format!("{now} [DEBUG] TEST TEXT > "));
}

fn a(w: &mut dyn ResponseWriter, _req: &Request) {
    w.write_text(" [A: Body Text] ");
}

fn b(w: &mut dyn ResponseWriter, _req: &Request) {
    w.write_text(" [B: This is more text] ");
}

fn panicky(_w: &mut dyn ResponseWriter, _req: &Request) {
    panic!(" going... < [A: Body Text]  > going...");
}
