//! Configuration types module

pub mod app;
pub mod diagnostics;
pub mod logging;
pub mod resolve;

// Re-export main types
pub use app::AppConfig;
pub use diagnostics::DiagnosticsConfig;
pub use logging::LoggingConfig;
pub use resolve::ResolveConfig;
