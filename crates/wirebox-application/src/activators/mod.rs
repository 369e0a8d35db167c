//! Activators
//!
//! An activator is the last stage of every registration pipeline: it
//! produces the component instance. Concrete construction strategies are
//! supplied by the caller; the stock activators here cover closures,
//! pre-built instances, and constructor-style dependency injection over
//! [`TypeDescriptor`]s.

mod constructor;
mod delegate;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use wirebox_domain::{Result, TypeDescriptor};

use crate::parameters::Parameter;
use crate::resolving::ResolveRequestContext;

pub use constructor::{ConstructorActivator, ConstructorFactory};
pub use delegate::{DelegateActivator, ProvidedInstanceActivator};

/// A resolved component instance
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Produces component instances for a registration
pub trait Activator: Send + Sync + fmt::Debug {
    /// The most specific type the activator is known to produce
    fn limit_type(&self) -> &TypeDescriptor;

    /// Create an instance, consulting `parameters` before resolving dependencies
    fn activate(
        &self,
        context: &mut ResolveRequestContext<'_>,
        parameters: &[Parameter],
    ) -> Result<Instance>;
}
