//! Copy mode: the process acting as the toolchain's `-exec` helper.
//!
//! When the toolchain runs `go run -exec <wasmserve> <pkg> <output>`, it
//! invokes `<wasmserve> <compiled-binary> <output>` with `WASMSERVE=cp` in
//! the environment. That invocation copies the binary into place and exits
//! without binding a listener.

use anyhow::{Context, Result, bail};
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io;
use std::path::Path;

/// Environment variable selecting copy mode.
pub const COPY_MODE_ENV: &str = "WASMSERVE";

/// Value of [`COPY_MODE_ENV`] that selects copy mode.
pub const COPY_MODE_VALUE: &str = "cp";

/// Whether this process was started as the toolchain's copy helper.
pub fn is_copy_mode() -> bool {
    is_copy_sentinel(std::env::var_os(COPY_MODE_ENV).as_deref())
}

fn is_copy_sentinel(value: Option<&OsStr>) -> bool {
    value.is_some_and(|v| v == COPY_MODE_VALUE)
}

/// Copy the file named by the first positional argument to the second.
pub fn run(args: impl IntoIterator<Item = OsString>) -> Result<()> {
    let mut args = args.into_iter();
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        bail!("copy mode expects <input> <output> arguments");
    };
    copy_file(Path::new(&input), Path::new(&output))?;
    Ok(())
}

/// Copy `input` to `output`, replacing it atomically.
///
/// The data goes to a temporary file beside `output`, is synced, and is then
/// renamed over `output`. Readers holding the previous artifact open keep
/// seeing the previous bytes.
pub fn copy_file(input: &Path, output: &Path) -> Result<u64> {
    let mut src = File::open(input)
        .with_context(|| format!("open input `{}`", input.display()))?;

    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".wasmserve-")
        .tempfile_in(dir)
        .with_context(|| format!("create output `{}`", output.display()))?;

    let copied = io::copy(&mut src, tmp.as_file_mut()).context("copy input to output")?;
    tmp.as_file().sync_all().context("flush output")?;
    tmp.persist(output)
        .map_err(|e| e.error)
        .with_context(|| format!("create output `{}`", output.display()))?;

    Ok(copied)
}
