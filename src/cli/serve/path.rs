//! URL to filesystem path resolution.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Request target split into its decoded path and raw query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    /// Path as sent by the client (still percent-encoded), always starting with `/`.
    raw: String,
    /// Percent-decoded path.
    decoded: String,
    query: Option<String>,
}

impl RequestPath {
    /// Parse a request target like `/dir/a%20b.txt?x=1`.
    pub fn parse(url: &str) -> Self {
        use percent_encoding::percent_decode_str;

        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (url, None),
        };
        let raw = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };
        let decoded = percent_decode_str(&raw).decode_utf8_lossy().into_owned();

        Self { raw, decoded, query }
    }

    /// Decoded path, starting with `/`.
    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.decoded
    }

    pub fn ends_with_slash(&self) -> bool {
        self.decoded.ends_with('/')
    }

    /// Last path segment; empty for directory URLs such as `/` or `/sub/`.
    pub fn final_segment(&self) -> &str {
        self.decoded.rsplit('/').next().unwrap_or_default()
    }

    /// Reject any `..` segment so resolution cannot leave the serve root.
    pub fn is_safe(&self) -> bool {
        Path::new(self.decoded.trim_start_matches('/'))
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    }

    /// Local filesystem path under `root`.
    pub fn local(&self, root: &Path) -> PathBuf {
        let relative = self.decoded.trim_start_matches('/');
        if relative.is_empty() {
            root.to_path_buf()
        } else {
            root.join(relative)
        }
    }

    /// Same URL with `/` appended to the path, query preserved.
    pub fn with_trailing_slash(&self) -> String {
        self.with_path(&format!("{}/", self.raw))
    }

    /// URL of the containing directory for an `.../index.html` request.
    pub fn without_index(&self) -> Option<String> {
        self.raw
            .strip_suffix("index.html")
            .filter(|dir| dir.ends_with('/'))
            .map(|dir| self.with_path(dir))
    }

    fn with_path(&self, path: &str) -> String {
        match &self.query {
            Some(query) => format!("{path}?{query}"),
            None => path.to_owned(),
        }
    }
}

/// `Ok(None)` when nothing exists at `path`; other stat errors are returned.
pub fn stat(path: &Path) -> io::Result<Option<std::fs::Metadata>> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(Some(meta)),
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::NotADirectory) => {
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
