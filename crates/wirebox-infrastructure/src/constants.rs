//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Resolution constants are defined in `wirebox_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "wirebox.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "wirebox";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "WIREBOX";

/// Separator between the prefix and nested keys of configuration variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Environment variable holding a tracing filter directive
pub const LOG_ENV_FILTER_VAR: &str = "WIREBOX_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum number of rotated log files to keep
pub const LOG_MAX_FILES: usize = 5;

/// Default log file stem when the configured path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "wirebox";

// ============================================================================
// DIAGNOSTICS CONSTANTS
// ============================================================================

/// Level at which resolve diagnostics are emitted by default
pub const DEFAULT_DIAGNOSTICS_LEVEL: &str = "debug";

/// Tracing target used for resolve diagnostics
pub const DIAGNOSTICS_TARGET: &str = "wirebox::resolve";
