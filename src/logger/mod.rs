//! Logger module
//!
//! Structured event logging for the HTTP engine:
//! - Server lifecycle events
//! - One event per accepted connection, dispatched request and written response
//! - Handler failures and per-connection I/O errors
//!
//! Events emitted before `init` fall back to stdout at INFO and above.

mod format;
pub mod writer;

pub use format::{Level, LogEvent, LogFormat};

use std::io;
use std::net::SocketAddr;

use crate::config::LoggingConfig;
use crate::http::Request;
use crate::routing::RouteKey;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> io::Result<()> {
    let level = config
        .level
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    writer::init(config.log_file.as_deref(), level, config.format)
}

/// Write an event to the global sink
pub fn emit(event: &LogEvent) {
    match writer::get() {
        Some(w) => w.write(event),
        None if event.level >= Level::Info => println!("{}", event.format(LogFormat::Logfmt)),
        None => {}
    }
}

pub fn log_server_start(addr: &SocketAddr, static_root: &str, concurrent: bool, routes: usize) {
    emit(
        &LogEvent::new(Level::Info, "server_start")
            .field("addr", addr)
            .field("static_root", static_root)
            .field("routes", routes)
            .field("mode", if concurrent { "concurrent" } else { "sequential" }),
    );
}

pub fn log_route_registered(key: &RouteKey, target: &str) {
    emit(
        &LogEvent::new(Level::Info, "route_registered")
            .field("method", key.method)
            .field("path", &key.path)
            .field("target", target),
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    emit(&connection_accepted_event(peer_addr));
}

fn connection_accepted_event(peer_addr: &SocketAddr) -> LogEvent {
    LogEvent::new(Level::Info, "connection_accepted").field("peer", peer_addr)
}

pub fn log_request(req: &Request) {
    emit(
        &LogEvent::new(Level::Info, "http_request")
            .field("method", req.method().map_or("-", |m| m.as_str()))
            .field("path", req.path()),
    );
}

pub fn log_response(path: &str, status: u16, body_bytes: usize) {
    emit(
        &LogEvent::new(Level::Info, "http_response")
            .field("status", status)
            .field("path", path)
            .field("bytes", body_bytes),
    );
}

pub fn log_connection_error(peer_addr: &SocketAddr, err: &io::Error) {
    emit(
        &LogEvent::new(Level::Warn, "connection_error")
            .field("peer", peer_addr)
            .field("error", err),
    );
}

pub fn log_accept_error(err: &io::Error) {
    emit(&LogEvent::new(Level::Warn, "accept_error").field("error", err));
}

pub fn log_handler_failure(route: &str, detail: &str) {
    emit(
        &LogEvent::new(Level::Error, "handler_failure")
            .field("route", route)
            .field("error", detail),
    );
}

pub fn log_traversal_blocked(path: &str) {
    emit(&LogEvent::new(Level::Warn, "path_traversal_blocked").field("path", path));
}

pub fn log_static_read_error(path: &std::path::Path, err: &io::Error) {
    emit(
        &LogEvent::new(Level::Error, "static_read_error")
            .field("file", path.display())
            .field("error", err),
    );
}

pub fn log_boot_failure(addr: &str, err: &dyn std::fmt::Display) {
    emit(
        &LogEvent::new(Level::Error, "server_boot_failure")
            .field("addr", addr)
            .field("error", err),
    );
}

pub fn log_shutdown() {
    emit(&LogEvent::new(Level::Info, "server_shutdown"));
}
