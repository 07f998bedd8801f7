//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Build a Go package to WebAssembly on demand and serve it with live reload
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// HTTP bind address to serve (e.g. `:8080`, `127.0.0.1:9000`)
    #[arg(long, value_name = "ADDR")]
    pub http: Option<String>,

    /// Build tags passed to the Go toolchain
    #[arg(long)]
    pub tags: Option<String>,

    /// Allow the given origin (or `*` for all origins) to make requests to this server
    #[arg(long = "allow-origin", value_name = "ORIGIN")]
    pub allow_origin: Option<String>,

    /// Overwrite source files with a JSON overlay file (see `go help build`)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub overlay: Option<PathBuf>,

    /// Config file path (default: wasmserve.toml, optional)
    #[arg(
        short = 'C',
        long,
        default_value = "wasmserve.toml",
        value_hint = clap::ValueHint::FilePath
    )]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Package to build, followed by arguments passed to the program as `os.Args`
    #[arg(value_name = "PACKAGE [ARGS]", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl Cli {
    /// Package path from the first positional argument.
    pub fn package(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}
