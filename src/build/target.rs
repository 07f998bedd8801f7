//! What to compile and how.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Package to compile plus the options the toolchain is invoked with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Package path, directory, or `path@version`.
    pub package: String,
    pub tags: Option<String>,
    pub overlay: Option<PathBuf>,
    /// Extra flags placed before the package.
    pub flags: Vec<String>,
    /// File name of the compiled module inside the output directory.
    pub artifact: String,
}

impl BuildTarget {
    /// Arguments for `go run -exec <exe> ... <package> <output>`.
    ///
    /// `go run` is used instead of `go build -o` so `path@version` packages
    /// work; the toolchain runs `<exe> <binary> <output>`, which copies the
    /// binary into place.
    pub fn toolchain_args(&self, exe: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["run".into(), "-exec".into(), exe.into()];
        if let Some(tags) = self.tags.as_deref().filter(|t| !t.is_empty()) {
            args.push("-tags".into());
            args.push(tags.into());
        }
        if let Some(overlay) = &self.overlay {
            args.push("-overlay".into());
            args.push(overlay.into());
        }
        args.extend(self.flags.iter().map(OsString::from));
        args.push(self.package.as_str().into());
        args.push(output.into());
        args
    }
}
