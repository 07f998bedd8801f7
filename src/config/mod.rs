//! Server configuration for `wasmserve.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [serve] and [build] section definitions
//! ├── error.rs       # ConfigError
//! ├── util.rs        # bind address parsing
//! └── mod.rs         # ServerConfig (this file)
//! ```
//!
//! The config file is optional. Values given on the command line override
//! the ones read from the file.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{BuildSectionConfig, ServeSectionConfig};
pub use util::parse_bind_addr;

use crate::{build::BuildTarget, cli::Cli, debug};
use anyhow::Result;
use serde::Deserialize;
use std::{
    fs,
    net::SocketAddr,
    path::Path,
};

/// Root configuration structure representing wasmserve.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Development server settings
    #[serde(default)]
    pub serve: ServeSectionConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Positional arguments: the package followed by program arguments
    #[serde(skip)]
    pub args: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from CLI arguments.
    ///
    /// A missing config file is not an error: defaults apply.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.is_file() {
            debug!("config"; "loading {}", cli.config.display());
            Self::from_path(&cli.config)?
        } else {
            Self::default()
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Apply command line values over the file values.
    ///
    /// Builds run in the serve root, so a relative `--overlay` is anchored to
    /// the launch directory here. The package and a file-configured overlay
    /// stay relative to the serve root.
    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.serve.http, cli.http.as_ref());
        if cli.allow_origin.is_some() {
            self.serve.allow_origin.clone_from(&cli.allow_origin);
        }
        if cli.tags.is_some() {
            self.build.tags.clone_from(&cli.tags);
        }
        if let Some(overlay) = &cli.overlay {
            let anchored = std::path::absolute(overlay).unwrap_or_else(|_| overlay.clone());
            self.build.overlay = Some(anchored);
        }
        self.args.clone_from(&cli.args);

        // an empty origin means no CORS header, as if unset
        if self.serve.allow_origin.as_deref() == Some("") {
            self.serve.allow_origin = None;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate values that serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build.validate()?;
        parse_bind_addr(&self.serve.http)?;
        Ok(())
    }

    /// Directory all request paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.serve.root
    }

    /// Resolved bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_bind_addr(&self.serve.http)
    }

    /// File name of the compiled module (e.g. `main.wasm`).
    pub fn artifact_name(&self) -> &str {
        &self.build.artifact
    }

    /// Build target for the configured package.
    pub fn build_target(&self) -> BuildTarget {
        BuildTarget {
            package: self.args.first().cloned().unwrap_or_else(|| ".".to_owned()),
            tags: self.build.tags.clone(),
            overlay: self.build.overlay.clone(),
            flags: self.build.flags.clone(),
            artifact: self.build.artifact.clone(),
        }
    }
}

/// Parse a config from TOML for tests, panicking on error.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ServerConfig {
    ServerConfig::from_str(content).expect("test config should parse")
}
