use std::fmt;
use std::sync::Arc;

use wirebox_domain::{Result, TypeDescriptor};

use super::{Activator, Instance};
use crate::parameters::Parameter;
use crate::resolving::ResolveRequestContext;

type ActivationDelegate =
    Arc<dyn Fn(&mut ResolveRequestContext<'_>, &[Parameter]) -> Result<Instance> + Send + Sync>;

/// Activates components by calling a closure
pub struct DelegateActivator {
    limit_type: TypeDescriptor,
    delegate: ActivationDelegate,
}

impl DelegateActivator {
    /// Wrap `delegate` as an activator for `limit_type`
    pub fn new<F>(limit_type: TypeDescriptor, delegate: F) -> Self
    where
        F: Fn(&mut ResolveRequestContext<'_>, &[Parameter]) -> Result<Instance>
            + Send
            + Sync
            + 'static,
    {
        Self {
            limit_type,
            delegate: Arc::new(delegate),
        }
    }
}

impl fmt::Debug for DelegateActivator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateActivator")
            .field("limit_type", &self.limit_type.to_string())
            .finish()
    }
}

impl Activator for DelegateActivator {
    fn limit_type(&self) -> &TypeDescriptor {
        &self.limit_type
    }

    fn activate(
        &self,
        context: &mut ResolveRequestContext<'_>,
        parameters: &[Parameter],
    ) -> Result<Instance> {
        (self.delegate)(context, parameters)
    }
}

/// Hands out one pre-built instance
pub struct ProvidedInstanceActivator {
    limit_type: TypeDescriptor,
    instance: Instance,
}

impl ProvidedInstanceActivator {
    /// Activator that always returns `instance`
    pub fn new(limit_type: TypeDescriptor, instance: Instance) -> Self {
        Self {
            limit_type,
            instance,
        }
    }
}

impl fmt::Debug for ProvidedInstanceActivator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvidedInstanceActivator")
            .field("limit_type", &self.limit_type.to_string())
            .finish()
    }
}

impl Activator for ProvidedInstanceActivator {
    fn limit_type(&self) -> &TypeDescriptor {
        &self.limit_type
    }

    fn activate(
        &self,
        _context: &mut ResolveRequestContext<'_>,
        _parameters: &[Parameter],
    ) -> Result<Instance> {
        Ok(self.instance.clone())
    }
}
