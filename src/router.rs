//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. The router only picks a
//! handler; everything about how the response is produced lives in the
//! handler graph it points to.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup, so this is a
    /// programming error.
    ///
    /// ```rust
    /// # use wrapchain::{handler_fn, Router};
    /// use http::Method;
    ///
    /// Router::new()
    ///     .on(Method::GET,    "/users/{id}", handler_fn(|w, req| { w.write_text(req.param("id").unwrap_or("")); }))
    ///     .on(Method::DELETE, "/users/{id}", handler_fn(|w, _| w.write_status(204)));
    /// ```
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.boxed())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Shorthand for `on(Method::GET, path, handler)`.
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{NoOp, handler_fn};

    #[test]
    fn lookup_by_method_and_path() {
        let router = Router::new()
            .get("/", NoOp)
            .on(Method::POST, "/users/{id}", handler_fn(|w, _| w.write_status(201)));

        assert!(router.lookup(&Method::GET, "/").is_some());
        assert!(router.lookup(&Method::POST, "/").is_none());
        assert!(router.lookup(&Method::GET, "/missing").is_none());

        let (_, params) = router.lookup(&Method::POST, "/users/42").unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic() {
        let _ = Router::new().get("/a", NoOp).get("/a", NoOp);
    }
}
