//! Controller module
//!
//! Declarative route binding: controller modules expose their routes as
//! `ControllerDescriptor`s and `RouteRegistry::mount` binds them into handlers.

mod binder;
mod descriptor;

pub use binder::{bind, convert, invoke, resolve_args};
pub use descriptor::{
    Arg, Args, ControllerDescriptor, DescriptorError, HandlerError, HandlerResult, ParamBinding,
    ParamType, Target,
};

use crate::logger;
use crate::routing::RouteRegistry;

impl RouteRegistry {
    /// Bind and register every descriptor, in order
    ///
    /// A later descriptor for the same method and path replaces an earlier one.
    pub fn mount<I>(&mut self, descriptors: I) -> Result<(), DescriptorError>
    where
        I: IntoIterator<Item = ControllerDescriptor>,
    {
        for descriptor in descriptors {
            let handler = bind(&descriptor)?;
            let key = descriptor.route_key();
            self.register_shared(key.method, &key.path, handler);
            logger::log_route_registered(&key, &descriptor.name);
        }
        Ok(())
    }
}
