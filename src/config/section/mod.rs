//! Configuration section definitions.
//!
//! Each module corresponds to a section in `wasmserve.toml`:
//!
//! | Module  | TOML Section | Purpose                                |
//! |---------|--------------|----------------------------------------|
//! | `build` | `[build]`    | Toolchain, tags, overlay, artifact     |
//! | `serve` | `[serve]`    | Bind address, CORS, serve root         |

mod build;
mod serve;

pub use build::BuildSectionConfig;
pub use serve::ServeSectionConfig;
