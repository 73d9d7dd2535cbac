//! Controller descriptor module
//!
//! A descriptor binds a target function to an HTTP method and path, with an
//! ordered list of parameter bindings the binder resolves per request.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::http::{Method, Request, Response};
use crate::routing::RouteKey;

/// Outcome of a controller target: `Some(text)` becomes a `text/plain` 200,
/// `None` leaves the response as the target wrote it
pub type HandlerResult = Result<Option<String>, HandlerError>;

/// Controller target function
pub type Target = Arc<dyn Fn(&mut Args<'_>) -> HandlerResult + Send + Sync>;

/// Failures a controller target can report
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Client input was unusable; the message is sent back with a 400
    #[error("{0}")]
    BadRequest(String),

    /// Anything else; logged, never sent to the client
    #[error("{0}")]
    Internal(String),
}

/// Descriptor rejected at mount time
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("{route} ({target}) binds the Response more than once")]
    DuplicateResponse { route: String, target: String },
}

/// Declared type of a query-bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Str,
    Int,
    Long,
    Double,
    Bool,
}

impl ParamType {
    /// Type name used in Bad-Request messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::Str => "String",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Bool => "boolean",
        }
    }
}

/// How one target parameter is resolved from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBinding {
    /// Pass the live request
    Request,
    /// Pass the live response
    Response,
    /// Read query parameter `name`, use `default` when absent or empty, convert to `ty`
    Query {
        name: String,
        default: String,
        ty: ParamType,
    },
}

impl ParamBinding {
    pub fn query(name: &str, default: &str, ty: ParamType) -> Self {
        Self::Query {
            name: name.to_string(),
            default: default.to_string(),
            ty,
        }
    }
}

/// A resolved argument
#[derive(Debug)]
pub enum Arg<'a> {
    Request(&'a Request),
    Response(&'a mut Response),
    Str(String),
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
}

/// Positional arguments handed to a controller target
#[derive(Debug)]
pub struct Args<'a> {
    values: Vec<Arg<'a>>,
}

impl<'a> Args<'a> {
    pub(crate) const fn new(values: Vec<Arg<'a>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn request(&self, index: usize) -> Result<&Request, HandlerError> {
        match self.values.get(index) {
            Some(Arg::Request(req)) => Ok(*req),
            _ => Err(mismatch(index, "Request")),
        }
    }

    pub fn response(&mut self, index: usize) -> Result<&mut Response, HandlerError> {
        match self.values.get_mut(index) {
            Some(Arg::Response(res)) => Ok(&mut **res),
            _ => Err(mismatch(index, "Response")),
        }
    }

    pub fn str(&self, index: usize) -> Result<&str, HandlerError> {
        match self.values.get(index) {
            Some(Arg::Str(s)) => Ok(s.as_str()),
            _ => Err(mismatch(index, ParamType::Str.name())),
        }
    }

    pub fn int(&self, index: usize) -> Result<i32, HandlerError> {
        match self.values.get(index) {
            Some(Arg::Int(v)) => Ok(*v),
            _ => Err(mismatch(index, ParamType::Int.name())),
        }
    }

    pub fn long(&self, index: usize) -> Result<i64, HandlerError> {
        match self.values.get(index) {
            Some(Arg::Long(v)) => Ok(*v),
            _ => Err(mismatch(index, ParamType::Long.name())),
        }
    }

    pub fn double(&self, index: usize) -> Result<f64, HandlerError> {
        match self.values.get(index) {
            Some(Arg::Double(v)) => Ok(*v),
            _ => Err(mismatch(index, ParamType::Double.name())),
        }
    }

    pub fn bool(&self, index: usize) -> Result<bool, HandlerError> {
        match self.values.get(index) {
            Some(Arg::Bool(v)) => Ok(*v),
            _ => Err(mismatch(index, ParamType::Bool.name())),
        }
    }
}

fn mismatch(index: usize, expected: &str) -> HandlerError {
    HandlerError::Internal(format!("argument {index} is not a {expected}"))
}

/// Route metadata for one controller function
#[derive(Clone)]
pub struct ControllerDescriptor {
    /// Display name, e.g. `HelloController.greeting`
    pub name: String,
    pub method: Method,
    pub path: String,
    pub params: Vec<ParamBinding>,
    target: Target,
}

impl ControllerDescriptor {
    pub fn new<F>(method: Method, path: &str, name: &str, target: F) -> Self
    where
        F: Fn(&mut Args<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            method,
            path: path.to_string(),
            params: Vec::new(),
            target: Arc::new(target),
        }
    }

    pub fn get<F>(path: &str, name: &str, target: F) -> Self
    where
        F: Fn(&mut Args<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(Method::Get, path, name, target)
    }

    pub fn post<F>(path: &str, name: &str, target: F) -> Self
    where
        F: Fn(&mut Args<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(Method::Post, path, name, target)
    }

    pub fn put<F>(path: &str, name: &str, target: F) -> Self
    where
        F: Fn(&mut Args<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(Method::Put, path, name, target)
    }

    pub fn patch<F>(path: &str, name: &str, target: F) -> Self
    where
        F: Fn(&mut Args<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(Method::Patch, path, name, target)
    }

    pub fn delete<F>(path: &str, name: &str, target: F) -> Self
    where
        F: Fn(&mut Args<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        Self::new(Method::Delete, path, name, target)
    }

    /// Append a parameter binding
    #[must_use]
    pub fn param(mut self, binding: ParamBinding) -> Self {
        self.params.push(binding);
        self
    }

    /// Append a query binding
    #[must_use]
    pub fn query(self, name: &str, default: &str, ty: ParamType) -> Self {
        self.param(ParamBinding::query(name, default, ty))
    }

    pub const fn target(&self) -> &Target {
        &self.target
    }

    pub fn route_key(&self) -> RouteKey {
        RouteKey::new(self.method, &self.path)
    }

    /// Only one mutable borrow of the response can be handed out
    pub fn validate(&self) -> Result<(), DescriptorError> {
        let responses = self
            .params
            .iter()
            .filter(|p| matches!(p, ParamBinding::Response))
            .count();
        if responses > 1 {
            return Err(DescriptorError::DuplicateResponse {
                route: self.route_key().to_string(),
                target: self.name.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ControllerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerDescriptor")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
