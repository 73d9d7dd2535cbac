//! Static file serving module
//!
//! Handles static file loading, MIME type detection, and response building
//! for requests no registered route matched.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::config::StaticConfig;
use crate::http::{build_404_response, mime, Response};
use crate::logger;
use crate::routing::normalize_path;

const DEFAULT_INDEX_FILE: &str = "index.html";

/// Resolves unmatched request paths against a static asset directory
#[derive(Debug, Clone)]
pub struct StaticFileResolver {
    root: PathBuf,
    index_file: String,
    spa_fallback: bool,
}

impl StaticFileResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            spa_fallback: false,
        }
    }

    pub fn from_config(config: &StaticConfig) -> Self {
        Self::new(&config.root)
            .with_index_file(&config.index_file)
            .with_spa_fallback(config.spa_fallback)
    }

    /// When enabled, any path without a file falls back to the root index file
    #[must_use]
    pub const fn with_spa_fallback(mut self, enabled: bool) -> Self {
        self.spa_fallback = enabled;
        self
    }

    #[must_use]
    pub fn with_index_file(mut self, index_file: &str) -> Self {
        self.index_file = index_file.to_string();
        self
    }

    /// Build the response for a request path no route matched
    pub async fn resolve(&self, path: &str) -> Response {
        let normalized = normalize_path(path);
        if let Some((content, content_type)) = self.load(&normalized).await {
            return build_file_response(content, content_type);
        }

        if self.spa_fallback && normalized != "/" {
            if let Some((content, content_type)) = self.load("/").await {
                return build_file_response(content, content_type);
            }
        }

        build_404_response(path)
    }

    /// Load a file for a normalized request path
    ///
    /// The root path and directories resolve to the index file. Anything that
    /// canonicalizes outside the root is refused.
    pub async fn load(&self, path: &str) -> Option<(Vec<u8>, &'static str)> {
        let relative = path.trim_start_matches('/');
        let mut file_path = self.root.join(relative);

        if relative.is_empty() || is_dir(&file_path).await {
            file_path = file_path.join(&self.index_file);
        }

        // A missing root or file is an ordinary 404, no need to log
        let root_canonical = fs::canonicalize(&self.root).await.ok()?;
        let file_canonical = fs::canonicalize(&file_path).await.ok()?;
        if !file_canonical.starts_with(&root_canonical) {
            logger::log_traversal_blocked(path);
            return None;
        }

        if !fs::metadata(&file_canonical).await.ok()?.is_file() {
            return None;
        }

        let content = match fs::read(&file_canonical).await {
            Ok(c) => c,
            Err(e) => {
                logger::log_static_read_error(&file_canonical, &e);
                return None;
            }
        };

        let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
        Some((content, content_type))
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

/// Build 200 response for a static file
fn build_file_response(content: Vec<u8>, content_type: &str) -> Response {
    let mut res = Response::new();
    res.set_header("Content-Type", content_type);
    res.set_header("Content-Length", content.len().to_string());
    res.set_body(content);
    res
}
