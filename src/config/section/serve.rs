//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! http = ":8080"              # Bind address (":port" = all interfaces)
//! allow_origin = "*"          # Sent as Access-Control-Allow-Origin
//! root = "."                  # Directory request paths resolve against
//! ```

use serde::Deserialize;
use std::path::PathBuf;

/// Development server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeSectionConfig {
    /// HTTP bind address.
    pub http: String,

    /// Origin allowed to make cross-origin requests (`*` for all).
    /// - unset (default): no CORS header is sent
    pub allow_origin: Option<String>,

    /// Directory static files, index lookups and builds are rooted at.
    pub root: PathBuf,
}

impl Default for ServeSectionConfig {
    fn default() -> Self {
        Self {
            http: ":8080".to_owned(),
            allow_origin: None,
            root: PathBuf::from("."),
        }
    }
}
