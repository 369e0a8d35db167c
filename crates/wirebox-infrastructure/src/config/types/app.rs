//! Top-level configuration

use serde::{Deserialize, Serialize};

use super::{DiagnosticsConfig, LoggingConfig, ResolveConfig};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Resolution limits
    #[serde(default)]
    pub resolve: ResolveConfig,
    /// Resolve diagnostics reporting
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}
