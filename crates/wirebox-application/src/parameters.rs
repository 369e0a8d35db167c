//! Activation parameters
//!
//! Parameters supply values for an activator's dependencies ahead of normal
//! resolution. The first parameter that can supply a dependency wins.

use std::fmt;
use std::sync::Arc;

use wirebox_domain::{Result, TypeDescriptor};

use crate::activators::Instance;
use crate::resolving::ResolveRequestContext;

/// The dependency slot a parameter is asked about
#[derive(Debug, Clone, Copy)]
pub struct ParameterInfo<'a> {
    /// Zero-based position of the dependency
    pub position: usize,
    /// Declared (closed) type of the dependency
    pub parameter_type: &'a TypeDescriptor,
}

type ParameterPredicate = Arc<dyn Fn(&ParameterInfo<'_>) -> bool + Send + Sync>;
type ParameterProvider =
    Arc<dyn Fn(&ParameterInfo<'_>, &mut ResolveRequestContext<'_>) -> Result<Instance> + Send + Sync>;

/// A value source for one activator dependency
#[derive(Clone)]
pub enum Parameter {
    /// Supplies the dependency at a fixed position
    Positional {
        /// Position matched
        position: usize,
        /// Value supplied
        value: Instance,
    },
    /// Supplies any dependency of the given type
    Typed {
        /// Type matched
        parameter_type: TypeDescriptor,
        /// Value supplied
        value: Instance,
    },
    /// Matches by predicate and produces the value lazily, possibly by
    /// resolving through the request context
    Resolved {
        /// Decides whether this parameter applies
        predicate: ParameterPredicate,
        /// Produces the value
        provider: ParameterProvider,
    },
}

impl Parameter {
    /// Positional parameter
    pub fn positional(position: usize, value: Instance) -> Self {
        Self::Positional { position, value }
    }

    /// Typed parameter
    pub fn typed(parameter_type: TypeDescriptor, value: Instance) -> Self {
        Self::Typed {
            parameter_type,
            value,
        }
    }

    /// Resolved parameter
    pub fn resolved<P, F>(predicate: P, provider: F) -> Self
    where
        P: Fn(&ParameterInfo<'_>) -> bool + Send + Sync + 'static,
        F: Fn(&ParameterInfo<'_>, &mut ResolveRequestContext<'_>) -> Result<Instance>
            + Send
            + Sync
            + 'static,
    {
        Self::Resolved {
            predicate: Arc::new(predicate),
            provider: Arc::new(provider),
        }
    }

    /// Whether this parameter can supply the dependency described by `info`
    pub fn can_supply(&self, info: &ParameterInfo<'_>) -> bool {
        match self {
            Self::Positional { position, .. } => *position == info.position,
            Self::Typed { parameter_type, .. } => parameter_type == info.parameter_type,
            Self::Resolved { predicate, .. } => predicate(info),
        }
    }

    /// Produce the value for the dependency described by `info`
    pub fn supply(
        &self,
        info: &ParameterInfo<'_>,
        context: &mut ResolveRequestContext<'_>,
    ) -> Result<Instance> {
        match self {
            Self::Positional { value, .. } | Self::Typed { value, .. } => Ok(value.clone()),
            Self::Resolved { provider, .. } => provider(info, context),
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional { position, .. } => {
                f.debug_struct("Positional").field("position", position).finish()
            }
            Self::Typed { parameter_type, .. } => f
                .debug_struct("Typed")
                .field("parameter_type", &parameter_type.to_string())
                .finish(),
            Self::Resolved { .. } => f.write_str("Resolved"),
        }
    }
}
