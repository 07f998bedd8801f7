//! Utility modules.

pub mod escape;
pub mod exec;
pub mod mime;
