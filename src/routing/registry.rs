//! Route registry module
//!
//! Exact (method, normalized path) lookup. The registry is populated before the
//! server starts and is read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::{Method, Request, Response};

/// Request handler: given a request, mutate the response
pub trait Handler: Send + Sync {
    fn handle(&self, req: &Request, res: &mut Response);
}

impl<F> Handler for F
where
    F: Fn(&Request, &mut Response) + Send + Sync,
{
    fn handle(&self, req: &Request, res: &mut Response) {
        self(req, res);
    }
}

/// Shared handler reference stored in the registry
pub type SharedHandler = Arc<dyn Handler>;

/// Registry lookup identity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub method: Method,
    pub path: String,
}

impl RouteKey {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: normalize_path(path),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Normalize a route path
///
/// Ensures a leading slash and strips trailing slashes, except for `/` itself.
/// An empty path becomes `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Method + path route table
#[derive(Default, Clone)]
pub struct RouteRegistry {
    routes: HashMap<RouteKey, SharedHandler>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any handler already bound to the same key
    pub fn register(&mut self, method: Method, path: &str, handler: impl Handler + 'static) {
        self.register_shared(method, path, Arc::new(handler));
    }

    pub fn register_shared(&mut self, method: Method, path: &str, handler: SharedHandler) {
        self.routes.insert(RouteKey::new(method, path), handler);
    }

    pub fn lookup(&self, method: Method, path: &str) -> Option<&SharedHandler> {
        self.routes.get(&RouteKey::new(method, path))
    }

    pub fn get(&mut self, path: &str, handler: impl Handler + 'static) {
        self.register(Method::Get, path, handler);
    }

    pub fn post(&mut self, path: &str, handler: impl Handler + 'static) {
        self.register(Method::Post, path, handler);
    }

    pub fn put(&mut self, path: &str, handler: impl Handler + 'static) {
        self.register(Method::Put, path, handler);
    }

    pub fn patch(&mut self, path: &str, handler: impl Handler + 'static) {
        self.register(Method::Patch, path, handler);
    }

    pub fn delete(&mut self, path: &str, handler: impl Handler + 'static) {
        self.register(Method::Delete, path, handler);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered keys, sorted for stable output
    pub fn keys(&self) -> Vec<&RouteKey> {
        let mut keys: Vec<_> = self.routes.keys().collect();
        keys.sort_by(|a, b| (&a.path, a.method.as_str()).cmp(&(&b.path, b.method.as_str())));
        keys
    }
}

impl fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}
