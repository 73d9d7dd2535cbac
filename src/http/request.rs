//! HTTP request parsing module
//!
//! Hand-rolled HTTP/1.1 request parsing. Malformed input never produces an
//! error: every stage degrades to a default value so the request is still served.

use std::collections::HashMap;
use std::io;

use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use url::Url;

use super::method::Method;

/// Parsed JSON request body
pub type JsonBody = Map<String, Value>;

const DEFAULT_VERSION: &str = "HTTP/1.1";

/// Base used to resolve request targets when extracting the query component
const QUERY_BASE: &str = "http://localhost/";

/// A parsed HTTP request, read-only once constructed
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Option<Method>,
    path: String,
    version: String,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    body: JsonBody,
}

/// Components of the request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// `None` when the token is not one of the routable methods
    pub method: Option<Method>,
    /// Raw request target, including any query string
    pub target: String,
    pub version: String,
}

impl Request {
    /// Assemble a request from an already split request line, header map and raw body
    pub fn from_parts(request_line: &str, headers: HashMap<String, String>, raw_body: &[u8]) -> Self {
        let line = parse_request_line(request_line);
        Self {
            method: line.method,
            path: path_of(&line.target),
            version: line.version,
            query: parse_query(&line.target),
            headers,
            body: parse_body(raw_body),
        }
    }

    /// Parse a complete request held in memory
    ///
    /// The body is whatever follows the header block, truncated to `Content-Length`.
    pub fn parse(raw: &[u8]) -> Self {
        let (head, rest) = split_head(raw);
        let head = String::from_utf8_lossy(head);
        let mut lines = head.split('\n').map(|l| l.trim_end_matches('\r'));

        let request_line = lines.next().unwrap_or_default();
        let mut block = HeaderBlock::default();
        for line in lines.take_while(|l| !l.is_empty()) {
            block.push(line);
        }

        let len = block.content_length.min(rest.len());
        Self::from_parts(request_line, block.headers, &rest[..len])
    }

    pub const fn method(&self) -> Option<Method> {
        self.method
    }

    /// Request path without the query component
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub const fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Look up a header by name, ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub const fn body(&self) -> &JsonBody {
        &self.body
    }
}

/// Read exactly one request from a buffered stream
///
/// Reads the request line and headers up to the blank line, then
/// `Content-Length` bytes of body (capped at `max_body_size`). A short body
/// is tolerated: reading stops at EOF.
pub async fn read_request<R>(reader: &mut R, max_body_size: usize) -> io::Result<Request>
where
    R: AsyncBufRead + Unpin,
{
    let request_line = read_line(reader).await?.unwrap_or_default();

    let mut block = HeaderBlock::default();
    while let Some(line) = read_line(reader).await? {
        if line.is_empty() {
            break;
        }
        block.push(&line);
    }

    // The buffer grows with bytes actually received, not with the declared length
    let len = block.content_length.min(max_body_size);
    let mut body = Vec::new();
    (&mut *reader)
        .take(u64::try_from(len).unwrap_or(u64::MAX))
        .read_to_end(&mut body)
        .await?;

    Ok(Request::from_parts(&request_line, block.headers, &body))
}

/// Read one line, stripping the trailing CRLF. `None` at EOF.
async fn read_line<R>(reader: &mut R) -> io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Parse the request line
///
/// The method is everything before the first space. The rest is split on its
/// last space into target and version; without a second space the rest is
/// the target. Missing parts default to `/` and `HTTP/1.1`.
pub fn parse_request_line(line: &str) -> RequestLine {
    let line = line.trim();
    let (method, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let (target, version) = match rest.rsplit_once(' ') {
        Some((target, version)) => (target.trim(), version.trim()),
        None => (rest, ""),
    };

    let version = version.to_ascii_uppercase();
    RequestLine {
        method: method.parse().ok(),
        target: if target.is_empty() {
            "/".to_string()
        } else {
            target.to_string()
        },
        version: if version.starts_with("HTTP/") {
            version
        } else {
            DEFAULT_VERSION.to_string()
        },
    }
}

/// Split a header line on its first colon. Lines without a colon are ignored.
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Header lines collected in arrival order
///
/// A repeated name, in any letter case, replaces the earlier entry, so the
/// last `Content-Length` line decides the body length.
#[derive(Debug, Default)]
struct HeaderBlock {
    headers: HashMap<String, String>,
    content_length: usize,
}

impl HeaderBlock {
    fn push(&mut self, line: &str) {
        let Some((key, value)) = parse_header_line(line) else {
            return;
        };
        if key.eq_ignore_ascii_case("content-length") {
            self.content_length = parse_content_length(&value);
        }
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value);
    }
}

/// Body length from a `Content-Length` value, 0 when invalid
pub fn parse_content_length(value: &str) -> usize {
    value.trim().parse().unwrap_or(0)
}

/// Extract percent-decoded query parameters from a request target
///
/// Later duplicates overwrite earlier ones. Empty pairs are skipped.
/// An unparsable target yields an empty map.
pub fn parse_query(target: &str) -> HashMap<String, String> {
    let Ok(url) = Url::parse(QUERY_BASE).and_then(|base| base.join(target)) else {
        return HashMap::new();
    };
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Parse a JSON object body
///
/// Only attempted when the first non-whitespace character is `{` or `[`.
/// Anything that is not a JSON object ends up as an empty map.
pub fn parse_body(raw: &[u8]) -> JsonBody {
    let text = String::from_utf8_lossy(raw);
    match text.trim_start().chars().next() {
        Some('{' | '[') => serde_json::from_str(&text).unwrap_or_default(),
        _ => JsonBody::new(),
    }
}

fn path_of(target: &str) -> String {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Split raw bytes at the end of the header block
fn split_head(raw: &[u8]) -> (&[u8], &[u8]) {
    raw.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map_or((raw, &[][..]), |pos| (&raw[..pos], &raw[pos + 4..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line() {
        let line = parse_request_line("GET /hello?name=Bob HTTP/1.1");
        assert_eq!(line.method, Some(Method::Get));
        assert_eq!(line.target, "/hello?name=Bob");
        assert_eq!(line.version, "HTTP/1.1");
    }

    #[test]
    fn test_request_line_lowercase() {
        let line = parse_request_line("post /items http/1.0");
        assert_eq!(line.method, Some(Method::Post));
        assert_eq!(line.version, "HTTP/1.0");
    }

    #[test]
    fn test_request_line_missing_version() {
        let line = parse_request_line("GET /only-path");
        assert_eq!(line.target, "/only-path");
        assert_eq!(line.version, "HTTP/1.1");
    }

    #[test]
    fn test_request_line_degenerate() {
        let line = parse_request_line("GET");
        assert_eq!(line.method, Some(Method::Get));
        assert_eq!(line.target, "/");
        assert_eq!(line.version, "HTTP/1.1");

        let line = parse_request_line("");
        assert_eq!(line.method, None);
        assert_eq!(line.target, "/");
    }

    #[test]
    fn test_request_line_bad_version() {
        let line = parse_request_line("GET / garbage");
        assert_eq!(line.version, "HTTP/1.1");
    }

    #[test]
    fn test_unknown_method_is_kept_as_none() {
        let req = Request::parse(b"HEAD / HTTP/1.1\r\n\r\n");
        assert_eq!(req.method(), None);
        assert_eq!(req.path(), "/");
    }

    #[test]
    fn test_header_lines() {
        assert_eq!(
            parse_header_line("Host:  example.com "),
            Some(("Host".to_string(), "example.com".to_string()))
        );
        assert_eq!(
            parse_header_line("X-Time: 12:30"),
            Some(("X-Time".to_string(), "12:30".to_string()))
        );
        assert_eq!(parse_header_line("no colon here"), None);
    }

    #[test]
    fn test_query_parsing() {
        let q = parse_query("/p?a=1&b=2");
        assert_eq!(q.len(), 2);
        assert_eq!(q["a"], "1");
        assert_eq!(q["b"], "2");

        assert!(parse_query("/p").is_empty());
    }

    #[test]
    fn test_query_decoding() {
        let q = parse_query("/p?na%20me=J%C3%BCrgen+M&&x=1&x=2");
        assert_eq!(q["na me"], "Jürgen M");
        assert_eq!(q["x"], "2");
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_query_malformed_percent() {
        let q = parse_query("/p?a=%ZZ&b=%");
        assert_eq!(q.get("a").map(String::as_str), Some("%ZZ"));
        assert_eq!(q.get("b").map(String::as_str), Some("%"));
    }

    #[test]
    fn test_body_parsing() {
        let body = parse_body(br#"{"a":1}"#);
        assert!(body.contains_key("a"));

        assert!(parse_body(b"not json").is_empty());
        assert!(parse_body(b"").is_empty());
        assert!(parse_body(b"{broken").is_empty());
        assert!(parse_body(b"[1, 2, 3]").is_empty());
        assert!(!parse_body(b"  \n {\"k\": [1]}").is_empty());
    }

    #[test]
    fn test_parse_full_request() {
        let raw = b"POST /api/items/?page=2 HTTP/1.1\r\n\
                    Host: localhost\r\n\
                    content-length: 13\r\n\
                    \r\n\
                    {\"id\": 42}   trailing";
        let req = Request::parse(raw);
        assert_eq!(req.method(), Some(Method::Post));
        assert_eq!(req.path(), "/api/items/");
        assert_eq!(req.query_param("page"), Some("2"));
        assert_eq!(req.header("HOST"), Some("localhost"));
        assert_eq!(req.body().get("id"), Some(&Value::from(42)));
    }

    #[test]
    fn test_invalid_content_length_means_no_body() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n{\"a\":1}";
        let req = Request::parse(raw);
        assert!(req.body().is_empty());
    }

    #[tokio::test]
    async fn test_read_request_from_stream() {
        let raw: &[u8] = b"PUT /x HTTP/1.1\r\nContent-Length: 7\r\nX-Ignored\r\n\r\n{\"b\":2}";
        let mut reader = raw;
        let req = read_request(&mut reader, 1024).await.unwrap();
        assert_eq!(req.method(), Some(Method::Put));
        assert_eq!(req.headers().len(), 1);
        assert!(req.body().contains_key("b"));
    }

    #[tokio::test]
    async fn test_read_request_short_body() {
        let raw: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 100\r\n\r\n{\"b\":2}";
        let mut reader = raw;
        let req = read_request(&mut reader, 1024).await.unwrap();
        assert!(req.body().contains_key("b"));
    }

    #[tokio::test]
    async fn test_read_request_body_capped() {
        let raw: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 7\r\n\r\n{\"b\":2}";
        let mut reader = raw;
        let req = read_request(&mut reader, 4).await.unwrap();
        assert!(req.body().is_empty());
    }

    #[tokio::test]
    async fn test_read_request_empty_stream() {
        let mut reader: &[u8] = b"";
        let req = read_request(&mut reader, 1024).await.unwrap();
        assert_eq!(req.method(), None);
        assert_eq!(req.path(), "/");
        assert_eq!(req.version(), "HTTP/1.1");
    }

    #[test]
    fn test_last_content_length_wins_across_letter_case() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 0\r\ncontent-length: 7\r\n\r\n{\"a\":1}";
        for _ in 0..50 {
            let req = Request::parse(raw);
            assert!(req.body().contains_key("a"));
            assert_eq!(req.headers().len(), 1);
            assert_eq!(req.header("Content-Length"), Some("7"));
        }

        let raw = b"POST / HTTP/1.1\r\ncontent-length: 7\r\nContent-Length: 0\r\n\r\n{\"a\":1}";
        assert!(Request::parse(raw).body().is_empty());
    }

    #[tokio::test]
    async fn test_read_request_last_content_length_wins() {
        let raw: &[u8] = b"POST / HTTP/1.1\r\nContent-Length: 0\r\nCONTENT-LENGTH: 7\r\n\r\n{\"b\":2}";
        let mut reader = raw;
        let req = read_request(&mut reader, 1024).await.unwrap();
        assert!(req.body().contains_key("b"));
    }

    #[tokio::test]
    async fn test_declared_length_larger_than_received_body() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut reader = tokio::io::BufReader::new(server);
        tokio::io::AsyncWriteExt::write_all(
            &mut client,
            b"POST / HTTP/1.1\r\nContent-Length: 10485760\r\n\r\n{\"c\":3}",
        )
        .await
        .unwrap();
        drop(client);

        let req = read_request(&mut reader, 10_485_760).await.unwrap();
        assert!(req.body().contains_key("c"));
    }

    #[test]
    fn test_query_params_map() {
        let req = Request::parse(b"GET /p?a=1&b=2&a=3 HTTP/1.1\r\n\r\n");
        let params = req.query_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a").map(String::as_str), Some("3"));
        assert_eq!(params.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_parse_content_length() {
        assert_eq!(parse_content_length(" 12 "), 12);
        assert_eq!(parse_content_length("-1"), 0);
        assert_eq!(parse_content_length("lots"), 0);
    }
}
