//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! toolchain = "go"            # Go command used for builds and GOROOT lookup
//! tags = "example,debug"      # Build tags (-tags)
//! overlay = "overlay.json"    # Source overlay file (-overlay)
//! flags = ["-trimpath"]       # Extra flags passed before the package
//! artifact = "main.wasm"      # File name the compiled module is served as
//! ```

use crate::config::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// Names the server answers itself; an artifact by one of these would never be built.
const RESERVED: [&str; 4] = ["index.html", "wasm_exec.js", "_wait", "_notify"];

/// Build settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSectionConfig {
    /// Go command (name on PATH or absolute path).
    pub toolchain: String,

    /// Build tags.
    pub tags: Option<String>,

    /// Source overlay JSON file, relative to the serve root.
    pub overlay: Option<PathBuf>,

    /// Extra toolchain flags.
    pub flags: Vec<String>,

    /// Artifact file name.
    pub artifact: String,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            toolchain: "go".to_owned(),
            tags: None,
            overlay: None,
            flags: Vec::new(),
            artifact: "main.wasm".to_owned(),
        }
    }
}

impl BuildSectionConfig {
    /// The artifact is matched against the final URL segment, so it must be
    /// a bare file name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let artifact = self.artifact.as_str();
        if artifact.is_empty()
            || artifact.contains(['/', '\\'])
            || artifact == "."
            || artifact == ".."
        {
            return Err(ConfigError::Validation(format!(
                "build.artifact must be a file name, got `{artifact}`"
            )));
        }
        if RESERVED.contains(&artifact) {
            return Err(ConfigError::Validation(format!(
                "build.artifact `{artifact}` is a reserved route"
            )));
        }
        if self.toolchain.trim().is_empty() {
            return Err(ConfigError::Validation("build.toolchain is empty".into()));
        }
        Ok(())
    }
}
