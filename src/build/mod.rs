//! On-demand WebAssembly builds.
//!
//! Every artifact request runs the toolchain again; nothing is memoized.
//!
//! ```text
//! ArtifactBuilder::build
//!   └─ go run -exec <self> <pkg> <outdir>/<artifact>   (GOOS=js GOARCH=wasm WASMSERVE=cp)
//!        └─ <self> <compiled> <outdir>/<artifact>      (copy mode)
//! ```
//!
//! # Modules
//!
//! - `output` - lazily created temp directory holding artifacts
//! - `target` - `BuildTarget` and its toolchain arguments
//! - `toolchain` - `go env GOROOT` and the `wasm_exec.js` shim

mod output;
mod target;
mod toolchain;

pub use output::OutputDir;
pub use target::BuildTarget;
pub use toolchain::Toolchain;

use crate::cli::copy::{COPY_MODE_ENV, COPY_MODE_VALUE};
use crate::utils::exec::{Cmd, combined_output};
use crate::{debug, log, logger};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment the toolchain runs with, on top of the inherited one.
const BUILD_ENV: [(&str, &str); 3] = [
    ("GOOS", "js"),
    ("GOARCH", "wasm"),
    (COPY_MODE_ENV, COPY_MODE_VALUE),
];

/// Errors that prevent a build from producing any outcome.
///
/// A compile error is not one of these: it is a [`BuildOutcome::Failure`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to create output directory")]
    OutputDir(#[source] io::Error),

    #[error("failed to locate own executable")]
    CurrentExe(#[source] io::Error),

    #[error("failed to open artifact `{0}`")]
    Open(PathBuf, #[source] io::Error),

    #[error("failed to query Go toolchain: {0}")]
    Toolchain(String),
}

/// Result of one build invocation.
#[derive(Debug)]
pub enum BuildOutcome {
    /// The artifact was written, closed, and reopened for reading.
    Success { path: PathBuf, file: File },
    /// Toolchain output explaining why the build failed.
    Failure { diagnostics: String },
}

/// Runs the toolchain for artifact requests.
pub struct ArtifactBuilder {
    toolchain: Toolchain,
    /// Working directory of the toolchain (the serve root).
    root: PathBuf,
    /// Executable the toolchain delegates the final copy to.
    exe: PathBuf,
    output: OutputDir,
}

impl ArtifactBuilder {
    /// Builder delegating the copy step to the running executable.
    pub fn new(toolchain: Toolchain, root: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let exe = std::env::current_exe().map_err(BuildError::CurrentExe)?;
        Ok(Self::with_exe(toolchain, root, exe))
    }

    pub fn with_exe(
        toolchain: Toolchain,
        root: impl Into<PathBuf>,
        exe: impl Into<PathBuf>,
    ) -> Self {
        Self {
            toolchain,
            root: root.into(),
            exe: exe.into(),
            output: OutputDir::new(),
        }
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Output directory, created on first call.
    pub fn output_dir(&self) -> Result<&Path, BuildError> {
        self.output.ensure().map_err(BuildError::OutputDir)
    }

    /// Where the artifact for `target` is written.
    pub fn artifact_path(&self, target: &BuildTarget) -> Result<PathBuf, BuildError> {
        Ok(self.output_dir()?.join(&target.artifact))
    }

    /// Compile `target` and open the result.
    pub fn build(&self, target: &BuildTarget) -> Result<BuildOutcome, BuildError> {
        let output = self.artifact_path(target)?;

        let cmd = Cmd::new(self.toolchain.program())
            .args(target.toolchain_args(&self.exe, &output))
            .envs(BUILD_ENV)
            .cwd(&self.root);
        log!("build"; "{}", cmd.display());

        let result = match cmd.output() {
            Ok(result) => result,
            Err(e) => {
                let diagnostics = format!("{e:#}");
                logger::status_error(&format!("build failed: {}", target.package), &diagnostics);
                return Ok(BuildOutcome::Failure { diagnostics });
            }
        };

        let text = combined_output(&result);
        if !result.status.success() {
            let diagnostics = if text.trim().is_empty() {
                format!("{} exited with {}", self.toolchain.program(), result.status)
            } else {
                text
            };
            logger::status_error(
                &format!("build failed: {}", target.package),
                diagnostics.trim_end(),
            );
            return Ok(BuildOutcome::Failure { diagnostics });
        }

        if !text.trim().is_empty() {
            log!("build"; "{}", text.trim_end());
        }

        let file = File::open(&output).map_err(|e| BuildError::Open(output.clone(), e))?;
        debug!("build"; "artifact {}", output.display());
        logger::status_success(&format!("built {}", target.package));
        Ok(BuildOutcome::Success { path: output, file })
    }
}
