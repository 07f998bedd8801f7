//! Request classification by final path segment.

/// Bootstrap page file name.
pub const INDEX: &str = "index.html";

/// Go runtime shim loaded by the bootstrap page.
pub const WASM_EXEC_JS: &str = "wasm_exec.js";

/// Long-poll endpoint released by [`NOTIFY`].
pub const WAIT: &str = "_wait";

/// Releases pending [`WAIT`] requests.
pub const NOTIFY: &str = "_notify";

/// What a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Directory URL or `index.html`: file on disk, else the bootstrap page.
    Index,
    /// `wasm_exec.js`: file on disk, else the toolchain's copy.
    RuntimeShim,
    /// The configured artifact name: file on disk, else a fresh build.
    Artifact,
    /// Block until the next notify.
    Wait,
    /// Release all pending waits.
    Notify,
    /// Anything else, served from disk.
    Static,
}

impl Route {
    /// Classify by the last URL segment (empty or `.` for a directory URL).
    pub fn classify(segment: &str, artifact: &str) -> Self {
        match segment {
            "" | "." | INDEX => Self::Index,
            WASM_EXEC_JS => Self::RuntimeShim,
            WAIT => Self::Wait,
            NOTIFY => Self::Notify,
            s if s == artifact => Self::Artifact,
            _ => Self::Static,
        }
    }

    /// Whether a file already on disk takes precedence over this route.
    pub const fn disk_first(self) -> bool {
        matches!(self, Self::Index | Self::RuntimeShim | Self::Artifact)
    }
}
