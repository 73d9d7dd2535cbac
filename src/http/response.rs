//! HTTP response module
//!
//! Mutable response model plus hand-framed wire serialization.
//! The writer never adds `Content-Length` or `Transfer-Encoding`: the
//! connection is closed after every response, so callers that want a
//! length header set it themselves.

use tokio::io::{AsyncWrite, AsyncWriteExt};

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// An HTTP response, mutated in place by handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    message: String,
    /// Insertion-ordered; a name appears at most once
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            message: "OK".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn status_message(&self) -> &str {
        &self.message
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing an existing value in place so its position is kept
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| k != name);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Serialize to wire bytes: status line, headers in stored order, blank line, body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(format!("HTTP/1.1 {} {}\r\n", self.status, self.message).as_bytes());
        for (key, value) in &self.headers {
            out.extend_from_slice(format!("{key}: {value}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }

    /// Write the serialized response and flush
    pub async fn write_to<W>(&self, writer: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        writer.write_all(&self.to_bytes()).await?;
        writer.flush().await
    }
}

/// Build 404 Not Found response naming the requested path
pub fn build_404_response(path: &str) -> Response {
    let mut res = Response::new();
    res.set_status(404);
    res.set_status_message("Not Found");
    res.set_header("Content-Type", TEXT_PLAIN_UTF8);
    res.set_body(format!("Static file or handler for {path} not found"));
    res
}

/// Build 500 Internal Server Error response with a generic body
pub fn build_500_response() -> Response {
    let mut res = Response::new();
    apply_internal_error(&mut res);
    res
}

/// Turn a response into a 400 carrying `message` as its body
pub fn apply_bad_request(res: &mut Response, message: &str) {
    res.set_status(400);
    res.set_status_message("Bad Request");
    res.set_body(message);
}

/// Turn a response into a 500 without exposing any detail
pub fn apply_internal_error(res: &mut Response) {
    res.set_status(500);
    res.set_status_message("Internal Server Error");
    res.set_body("Handler error");
}
