//! Routing module
//!
//! Provides the route table consulted before the static-file fallback:
//! - Path normalization
//! - Exact (method, path) matching
//! - The `Handler` abstraction shared by plain closures and bound controllers

mod registry;

pub use registry::{normalize_path, Handler, RouteKey, RouteRegistry, SharedHandler};
