//! Service identifiers
//!
//! A [`Service`] names what a caller wants resolved. Equality is structural,
//! so two independently constructed identifiers for the same type and key are
//! interchangeable as registry keys.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::types::TypeDescriptor;

/// Key carried by a keyed service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    /// Text key
    Text(Arc<str>),
    /// Integer key
    Integer(i64),
    /// Identifier key
    Id(Uuid),
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "{text}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for ServiceKey {
    fn from(value: &str) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl From<String> for ServiceKey {
    fn from(value: String) -> Self {
        Self::Text(Arc::from(value))
    }
}

impl From<i64> for ServiceKey {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Uuid> for ServiceKey {
    fn from(value: Uuid) -> Self {
        Self::Id(value)
    }
}

/// Identifier of a capability that can be resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Service {
    /// Identified by type alone
    Typed {
        /// The service type
        service_type: TypeDescriptor,
    },
    /// Identified by type and an arbitrary key
    Keyed {
        /// The distinguishing key
        key: ServiceKey,
        /// The service type
        service_type: TypeDescriptor,
    },
    /// Identified by type and a name
    Named {
        /// The distinguishing name
        name: Arc<str>,
        /// The service type
        service_type: TypeDescriptor,
    },
}

impl Service {
    /// A typed service
    pub fn typed(service_type: TypeDescriptor) -> Self {
        Self::Typed { service_type }
    }

    /// A keyed service
    pub fn keyed(key: impl Into<ServiceKey>, service_type: TypeDescriptor) -> Self {
        Self::Keyed {
            key: key.into(),
            service_type,
        }
    }

    /// A named service
    pub fn named(name: impl Into<Arc<str>>, service_type: TypeDescriptor) -> Self {
        Self::Named {
            name: name.into(),
            service_type,
        }
    }

    /// Typed service for a Rust type
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::typed(TypeDescriptor::of::<T>())
    }

    /// The type this service is identified by
    pub fn service_type(&self) -> &TypeDescriptor {
        match self {
            Self::Typed { service_type }
            | Self::Keyed { service_type, .. }
            | Self::Named { service_type, .. } => service_type,
        }
    }

    /// Same variant and key/name, different type
    pub fn change_type(&self, new_type: TypeDescriptor) -> Self {
        match self {
            Self::Typed { .. } => Self::Typed {
                service_type: new_type,
            },
            Self::Keyed { key, .. } => Self::Keyed {
                key: key.clone(),
                service_type: new_type,
            },
            Self::Named { name, .. } => Self::Named {
                name: name.clone(),
                service_type: new_type,
            },
        }
    }

    /// True when both services have the same variant and key/name
    pub fn same_identity_kind(&self, other: &Service) -> bool {
        match (self, other) {
            (Self::Typed { .. }, Self::Typed { .. }) => true,
            (Self::Keyed { key, .. }, Self::Keyed { key: other, .. }) => key == other,
            (Self::Named { name, .. }, Self::Named { name: other, .. }) => name == other,
            _ => false,
        }
    }

    /// True when the service type is an open generic
    pub fn is_open(&self) -> bool {
        self.service_type().is_open()
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed { service_type } => write!(f, "{service_type}"),
            Self::Keyed { key, service_type } => write!(f, "{service_type} ({key})"),
            Self::Named { name, service_type } => write!(f, "{service_type} ({name})"),
        }
    }
}
