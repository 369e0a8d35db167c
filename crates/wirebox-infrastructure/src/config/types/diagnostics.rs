//! Diagnostics configuration types

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DIAGNOSTICS_LEVEL;

/// Resolve diagnostics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Attach a logging tracer to the root scope
    pub enabled: bool,

    /// Level the tracer emits events at (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: DEFAULT_DIAGNOSTICS_LEVEL.to_string(),
        }
    }
}
