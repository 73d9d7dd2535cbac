//! HTTP protocol layer module
//!
//! Hand-rolled HTTP/1.1 framing: request parsing, response model and
//! serialization, and content-type detection. Nothing here knows about routes.

pub mod method;
pub mod mime;
pub mod request;
pub mod response;

// Re-export commonly used types
pub use method::Method;
pub use request::{read_request, JsonBody, Request};
pub use response::{build_404_response, build_500_response, Response, TEXT_PLAIN_UTF8};
