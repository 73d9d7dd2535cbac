//! Request dispatch module
//!
//! Entry point for request processing: exact route match on method and
//! normalized path, then the static-file fallback.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::config::AppState;
use crate::http::{build_500_response, Request, Response};
use crate::logger;
use crate::routing::RouteKey;

/// Produce the response for one request
///
/// A request whose method is not recognized never matches a route and goes
/// straight to the static fallback.
pub async fn dispatch(req: &Request, state: &AppState) -> Response {
    if let Some(method) = req.method() {
        if let Some(handler) = state.registry.lookup(method, req.path()) {
            let mut res = Response::new();
            let outcome = catch_unwind(AssertUnwindSafe(|| handler.handle(req, &mut res)));
            if outcome.is_err() {
                let route = RouteKey::new(method, req.path()).to_string();
                logger::log_handler_failure(&route, "handler panicked");
                return build_500_response();
            }
            return res;
        }
    }

    state.statics.resolve(req.path()).await
}
