//! Request handler module
//!
//! Dispatches parsed requests to registered routes, falling back to static
//! file serving for anything the registry does not match.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::dispatch;
pub use static_files::StaticFileResolver;
