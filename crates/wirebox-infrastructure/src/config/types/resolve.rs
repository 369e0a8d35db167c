//! Resolution configuration types

use serde::{Deserialize, Serialize};
use wirebox_domain::constants::DEFAULT_MAX_RESOLVE_DEPTH;

/// Resolution configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Maximum nesting of resolve requests inside one operation
    pub max_resolve_depth: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_resolve_depth: DEFAULT_MAX_RESOLVE_DEPTH,
        }
    }
}
