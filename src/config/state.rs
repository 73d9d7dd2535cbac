// Application state module
// Frozen serving state shared by every connection

use super::types::Config;
use crate::handler::static_files::StaticFileResolver;
use crate::routing::RouteRegistry;

/// Application state
///
/// Built once before the accept loop starts and never mutated afterwards,
/// so concurrent connections share it behind an `Arc` without locks.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    pub registry: RouteRegistry,
    pub statics: StaticFileResolver,
}

impl AppState {
    pub fn new(config: Config, registry: RouteRegistry) -> Self {
        let statics = StaticFileResolver::from_config(&config.static_files);
        Self {
            config,
            registry,
            statics,
        }
    }
}
