//! Registration value objects
//!
//! Identity and policy values attached to every component registration.

use std::fmt;

use uuid::Uuid;

/// Unique identity of a component registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    /// Generate a fresh random identity
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing identifier
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The underlying identifier
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RegistrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instance reuse policy of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SharingMode {
    /// A new instance for every request
    #[default]
    UniquePerRequest,
    /// One instance per lifetime scope
    SharedInScope,
    /// One instance for the root scope and all its children
    Singleton,
}

impl SharingMode {
    /// Whether instances are cached at all
    pub fn is_shared(&self) -> bool {
        !matches!(self, Self::UniquePerRequest)
    }
}

impl fmt::Display for SharingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::UniquePerRequest => "unique-per-request",
            Self::SharedInScope => "shared-in-scope",
            Self::Singleton => "singleton",
        };
        f.write_str(name)
    }
}

/// Where a registration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegistrationOrigin {
    /// Added directly during assembly
    #[default]
    Explicit,
    /// Synthesized on demand by a registration source
    DynamicSource,
}

impl fmt::Display for RegistrationOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::DynamicSource => f.write_str("from-dynamic-source"),
        }
    }
}
