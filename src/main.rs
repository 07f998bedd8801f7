//! wasmserve - a development server for Go WebAssembly programs.

mod build;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod reload;
mod utils;

use anyhow::Result;
use build::{ArtifactBuilder, Toolchain};
use clap::{ColorChoice, Parser};
use cli::Cli;
use cli::serve::{ServerState, bind};
use config::ServerConfig;
use std::sync::Arc;

fn main() -> Result<()> {
    // The toolchain re-invokes this executable to copy the compiled module.
    if cli::copy::is_copy_mode() {
        if let Err(e) = cli::copy::run(std::env::args_os().skip(1)) {
            log!("copy"; "{e:#}");
            std::process::exit(1);
        }
        return Ok(());
    }

    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(ServerConfig::load(&cli)?);
    let toolchain = Toolchain::new(config.build.toolchain.clone());
    let builder = ArtifactBuilder::new(toolchain, config.root())?;
    let state = Arc::new(ServerState::new(Arc::clone(&config), builder));

    let server = bind(state)?;
    core::register_server(server.server());

    log!("serve"; "http://{}", server.addr());
    debug!("serve"; "package {}", cli.package().unwrap_or("."));
    server.run()
}
