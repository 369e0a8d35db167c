//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns around the wirebox resolution core.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based configuration (defaults, TOML, environment) |
//! | [`constants`] | Centralized configuration constants |
//! | [`logging`] | Structured logging with tracing |
//! | [`diagnostics`] | Diagnostic tracer that reports resolve operations through tracing |
//! | [`bootstrap`] | Composition root: registry plus configured root scope |
//! | [`error_ext`] | Context extensions mapping foreign errors into domain errors |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error_ext;
pub mod logging;

// Re-export commonly used types
pub use bootstrap::Runtime;
pub use config::{AppConfig, ConfigLoader};
pub use diagnostics::LoggingDiagnosticTracer;
pub use error_ext::ErrorContext;
