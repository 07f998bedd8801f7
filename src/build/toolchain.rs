//! Go toolchain queries.

use super::BuildError;
use crate::utils::exec::Cmd;
use std::path::PathBuf;

/// The `go` command used for builds and installation lookups.
#[derive(Debug, Clone)]
pub struct Toolchain {
    program: String,
}

impl Toolchain {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Installation root reported by `go env GOROOT`.
    pub fn root(&self) -> Result<PathBuf, BuildError> {
        let output = Cmd::new(&self.program)
            .args(["env", "GOROOT"])
            .run()
            .map_err(|e| BuildError::Toolchain(format!("{e:#}")))?;

        let root = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        if root.is_empty() {
            return Err(BuildError::Toolchain("`go env GOROOT` printed nothing".into()));
        }
        Ok(PathBuf::from(root))
    }

    /// Location of the `wasm_exec.js` runtime shim.
    ///
    /// Go 1.24 moved it from `misc/wasm` to `lib/wasm`; the newer location
    /// wins when both exist. When neither exists the legacy path is returned
    /// and serving it reports not found.
    pub fn wasm_exec_js(&self) -> Result<PathBuf, BuildError> {
        let root = self.root()?;
        let current = root.join("lib").join("wasm").join("wasm_exec.js");
        if current.is_file() {
            return Ok(current);
        }
        Ok(root.join("misc").join("wasm").join("wasm_exec.js"))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::build::testing::fake_toolchain;
    use std::fs;
    use tempfile::TempDir;

    fn toolchain_with_root(dir: &TempDir, root: &std::path::Path) -> Toolchain {
        let script = format!("#!/bin/sh\necho '{}'\n", root.display());
        Toolchain::new(fake_toolchain(dir.path(), &script).to_string_lossy())
    }

    #[test]
    fn test_root() {
        let dir = TempDir::new().unwrap();
        let toolchain = toolchain_with_root(&dir, std::path::Path::new("/opt/go"));
        assert_eq!(toolchain.root().unwrap(), PathBuf::from("/opt/go"));
    }

    #[test]
    fn test_root_failure() {
        let dir = TempDir::new().unwrap();
        let script = "#!/bin/sh\necho 'go: not configured' >&2\nexit 2\n";
        let toolchain = Toolchain::new(fake_toolchain(dir.path(), script).to_string_lossy());
        let err = toolchain.root().unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn test_missing_program() {
        let toolchain = Toolchain::new("wasmserve-no-such-go");
        assert!(matches!(toolchain.root(), Err(BuildError::Toolchain(_))));
    }

    #[test]
    fn test_wasm_exec_prefers_lib() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("goroot");
        fs::create_dir_all(root.join("lib/wasm")).unwrap();
        fs::create_dir_all(root.join("misc/wasm")).unwrap();
        fs::write(root.join("lib/wasm/wasm_exec.js"), "// new").unwrap();
        fs::write(root.join("misc/wasm/wasm_exec.js"), "// old").unwrap();

        let toolchain = toolchain_with_root(&dir, &root);
        assert_eq!(
            toolchain.wasm_exec_js().unwrap(),
            root.join("lib/wasm/wasm_exec.js")
        );
    }

    #[test]
    fn test_wasm_exec_legacy_location() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("goroot");
        fs::create_dir_all(root.join("misc/wasm")).unwrap();
        fs::write(root.join("misc/wasm/wasm_exec.js"), "// old").unwrap();

        let toolchain = toolchain_with_root(&dir, &root);
        assert_eq!(
            toolchain.wasm_exec_js().unwrap(),
            root.join("misc/wasm/wasm_exec.js")
        );
    }
}
