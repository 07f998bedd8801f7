//! Command-line interface module.

mod args;
pub mod copy;
pub mod serve;

pub use args::Cli;
