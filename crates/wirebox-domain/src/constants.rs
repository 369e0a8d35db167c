//! Domain layer constants
//!
//! Contains constants that are part of the resolution semantics.
//! Configuration and logging constants live in `wirebox_infrastructure::constants`.

// ============================================================================
// RESOLUTION CONSTANTS
// ============================================================================

/// Default maximum nesting of resolve requests within one operation
pub const DEFAULT_MAX_RESOLVE_DEPTH: usize = 50;

/// Separator used when rendering generic argument lists
pub const GENERIC_ARGUMENT_SEPARATOR: &str = ", ";
