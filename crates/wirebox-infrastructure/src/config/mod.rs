//! Application configuration
//!
//! Types are plain serde structs with defaults; [`ConfigLoader`] layers
//! defaults, an optional TOML file and `WIREBOX__` environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
