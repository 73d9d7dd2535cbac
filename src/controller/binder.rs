//! Controller binder module
//!
//! Turns a `ControllerDescriptor` into a route `Handler`: resolves parameters,
//! invokes the target and shapes the response from its outcome.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use super::descriptor::{
    Arg, Args, ControllerDescriptor, DescriptorError, HandlerError, HandlerResult, ParamBinding,
    ParamType, Target,
};
use crate::http::response::{apply_bad_request, apply_internal_error};
use crate::http::{Request, Response, TEXT_PLAIN_UTF8};
use crate::logger;
use crate::routing::SharedHandler;

/// Build a handler for a descriptor
pub fn bind(descriptor: &ControllerDescriptor) -> Result<SharedHandler, DescriptorError> {
    descriptor.validate()?;

    let route = format!("{} -> {}", descriptor.route_key(), descriptor.name);
    let params = descriptor.params.clone();
    let target = Arc::clone(descriptor.target());

    Ok(Arc::new(move |req: &Request, res: &mut Response| {
        invoke(&route, &params, &target, req, res);
    }))
}

/// Resolve arguments, call the target and apply the outcome to `res`
pub fn invoke(
    route: &str,
    params: &[ParamBinding],
    target: &Target,
    req: &Request,
    res: &mut Response,
) {
    let outcome = catch_unwind(AssertUnwindSafe(|| -> HandlerResult {
        let mut args = resolve_args(params, req, res)?;
        target(&mut args)
    }));

    match outcome {
        Ok(Ok(Some(text))) => {
            res.set_status(200);
            res.set_header("Content-Type", TEXT_PLAIN_UTF8);
            res.set_body(text);
        }
        Ok(Ok(None)) => {}
        Ok(Err(HandlerError::BadRequest(message))) => apply_bad_request(res, &message),
        Ok(Err(HandlerError::Internal(detail))) => {
            logger::log_handler_failure(route, &detail);
            apply_internal_error(res);
        }
        Err(payload) => {
            logger::log_handler_failure(route, &panic_message(payload.as_ref()));
            apply_internal_error(res);
        }
    }
}

/// Resolve every binding, in declaration order
pub fn resolve_args<'a>(
    params: &[ParamBinding],
    req: &'a Request,
    res: &'a mut Response,
) -> Result<Args<'a>, HandlerError> {
    let mut res = Some(res);
    let mut values = Vec::with_capacity(params.len());

    for param in params {
        let arg = match param {
            ParamBinding::Request => Arg::Request(req),
            ParamBinding::Response => Arg::Response(
                res.take()
                    .ok_or_else(|| HandlerError::Internal("Response bound twice".to_string()))?,
            ),
            ParamBinding::Query { name, default, ty } => {
                let raw = req
                    .query_param(name)
                    .filter(|v| !v.is_empty())
                    .unwrap_or(default);
                convert(raw, *ty)?
            }
        };
        values.push(arg);
    }

    Ok(Args::new(values))
}

/// Convert raw query text to the declared type
///
/// Empty text converts to zero for numeric types. Booleans accept `true` in
/// any case; every other value is `false`.
pub fn convert<'a>(raw: &str, ty: ParamType) -> Result<Arg<'a>, HandlerError> {
    match ty {
        ParamType::Str => Ok(Arg::Str(raw.to_string())),
        ParamType::Int => parse_number(raw, ty).map(Arg::Int),
        ParamType::Long => parse_number(raw, ty).map(Arg::Long),
        ParamType::Double => parse_number(raw, ty).map(Arg::Double),
        ParamType::Bool => Ok(Arg::Bool(raw.eq_ignore_ascii_case("true"))),
    }
}

fn parse_number<T>(raw: &str, ty: ParamType) -> Result<T, HandlerError>
where
    T: FromStr + Default,
{
    if raw.is_empty() {
        return Ok(T::default());
    }
    raw.parse()
        .map_err(|_| HandlerError::BadRequest(format!("Invalid value for type {}", ty.name())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
