//! Application controllers
//!
//! Each controller exposes its routes as descriptors; `descriptors` gathers
//! them for the server binary.

pub mod health;
pub mod hello;

use crate::controller::ControllerDescriptor;

/// All application routes, in registration order
pub fn descriptors() -> Vec<ControllerDescriptor> {
    let mut routes = hello::routes();
    routes.extend(health::routes());
    routes
}
