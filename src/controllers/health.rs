//! Health-check controller
//!
//! Writes to the response directly instead of returning text.

use crate::controller::{Args, ControllerDescriptor, HandlerResult, ParamBinding};
use crate::http::TEXT_PLAIN_UTF8;

pub fn routes() -> Vec<ControllerDescriptor> {
    vec![ControllerDescriptor::get("/health", "HealthController.health", health)
        .param(ParamBinding::Request)
        .param(ParamBinding::Response)]
}

/// `GET /health`
pub fn health(args: &mut Args<'_>) -> HandlerResult {
    let verbose = args.request(0)?.query_param("verbose").is_some();
    let res = args.response(1)?;
    res.set_header("Content-Type", TEXT_PLAIN_UTF8);
    if verbose {
        res.set_body(format!(
            "The server is healthy (micro_web {})",
            env!("CARGO_PKG_VERSION")
        ));
    } else {
        res.set_body("The server is healthy");
    }
    Ok(None)
}
