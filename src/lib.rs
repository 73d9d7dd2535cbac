//! Minimal embedded HTTP/1.1 server
//!
//! One request per connection: the request is parsed, matched against the
//! route registry on method and normalized path, and anything unmatched is
//! served from the static directory.

pub mod config;
pub mod controller;
pub mod controllers;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
