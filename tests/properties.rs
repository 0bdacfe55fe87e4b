//! Property tests for composition and flushing.

use http::header::{HeaderName, HeaderValue};
use proptest::prelude::*;
use wrapchain::{
    BoxedHandler, BufferSource, Chain, Handler, PoolConfig, Recorder, Request, ResponseCapture,
    buffered, handler_fn,
};

#[derive(Clone, Debug)]
enum Op {
    Nothing,
    Write(String),
    Status(u16),
    Header(&'static str, String),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Nothing),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Op::Write),
        (100u16..600).prop_map(Op::Status),
        (prop::sample::select(vec!["x-a", "x-b", "content-type"]), "[a-z]{1,8}")
            .prop_map(|(name, value)| Op::Header(name, value)),
    ]
}

fn link(op: Op) -> BoxedHandler {
    handler_fn(move |w, _| match &op {
        Op::Nothing => {}
        Op::Write(text) => {
            w.write_text(text);
        }
        Op::Status(code) => w.write_status(*code),
        Op::Header(name, value) => {
            let value = HeaderValue::from_str(value).unwrap();
            w.headers_mut().insert(HeaderName::from_static(*name), value);
        }
    })
    .boxed()
}

fn serve(h: &impl Handler) -> Recorder {
    let mut rec = Recorder::new();
    h.serve(&mut rec, &Request::get("/"));
    rec
}

proptest! {
    #[test]
    fn sequential_body_is_concatenation(ops in prop::collection::vec(op(), 0..12)) {
        let expected: String = ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();

        let chain = Chain::new(ops.into_iter().map(link));
        let mut capture = ResponseCapture::new();
        chain.serve(&mut capture, &Request::get("/"));

        prop_assert_eq!(capture.body_string(), expected);
    }

    #[test]
    fn sink_matches_final_capture_state(ops in prop::collection::vec(op(), 0..12)) {
        let last_status = ops.iter().rev().find_map(|op| match op {
            Op::Status(code) => Some(*code),
            _ => None,
        });
        let mut last_header = std::collections::HashMap::new();
        for op in &ops {
            if let Op::Header(name, value) = op {
                last_header.insert(*name, value.clone());
            }
        }
        let mutates = ops.iter().any(|op| !matches!(op, Op::Nothing));

        let rec = serve(&buffered(Chain::new(ops.into_iter().map(link)), BufferSource::Fresh));

        prop_assert_eq!(rec.is_committed(), mutates);
        if mutates {
            prop_assert_eq!(rec.status(), last_status.unwrap_or(200));
        }
        for (name, value) in &last_header {
            prop_assert_eq!(rec.headers().get(*name).and_then(|v| v.to_str().ok()), Some(value.as_str()));
        }
    }

    #[test]
    fn pooled_and_fresh_are_indistinguishable(ops in prop::collection::vec(op(), 0..12)) {
        let links: Vec<BoxedHandler> = ops.into_iter().map(link).collect();
        let fresh = serve(&buffered(Chain::new(links.clone()), BufferSource::Fresh));
        let pooled_handler = buffered(
            Chain::new(links),
            BufferSource::pooled(PoolConfig { size: 2, alloc: 8 }),
        );
        // Run twice so the second pass uses a recycled buffer.
        let _ = serve(&pooled_handler);
        let pooled = serve(&pooled_handler);

        prop_assert_eq!(fresh.is_committed(), pooled.is_committed());
        prop_assert_eq!(fresh.status(), pooled.status());
        prop_assert_eq!(fresh.headers(), pooled.headers());
        prop_assert_eq!(fresh.body(), pooled.body());
    }
}
