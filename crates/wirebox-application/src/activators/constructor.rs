use std::fmt;
use std::sync::Arc;

use tracing::trace;
use wirebox_domain::{Error, Result, Service, TypeDescriptor};

use super::{Activator, Instance};
use crate::parameters::{Parameter, ParameterInfo};
use crate::resolving::ResolveRequestContext;

/// Builds an instance of a closed implementation type from its resolved
/// dependencies, in declaration order
pub type ConstructorFactory =
    Arc<dyn Fn(&TypeDescriptor, Vec<Instance>) -> Result<Instance> + Send + Sync>;

/// Constructor-injection activator over type descriptors
///
/// Each declared dependency is satisfied by the first parameter that can
/// supply it (request parameters first, then configured parameters), and
/// otherwise by resolving the typed service of the dependency type.
#[derive(Clone)]
pub struct ConstructorActivator {
    implementation_type: TypeDescriptor,
    dependencies: Vec<TypeDescriptor>,
    parameters: Vec<Parameter>,
    factory: ConstructorFactory,
}

impl ConstructorActivator {
    /// Activator for `implementation_type` taking `dependencies`
    pub fn new<I>(implementation_type: TypeDescriptor, dependencies: I, factory: ConstructorFactory) -> Self
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        Self {
            implementation_type,
            dependencies: dependencies.into_iter().collect(),
            parameters: Vec::new(),
            factory,
        }
    }

    /// Replace the configured parameters
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Declared dependency types
    pub fn dependencies(&self) -> &[TypeDescriptor] {
        &self.dependencies
    }

    /// Configured parameters, in priority order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn resolve_dependency(
        &self,
        context: &mut ResolveRequestContext<'_>,
        request_parameters: &[Parameter],
        info: &ParameterInfo<'_>,
    ) -> Result<Instance> {
        let supplied = request_parameters
            .iter()
            .chain(self.parameters.iter())
            .find(|p| p.can_supply(info));

        if let Some(parameter) = supplied {
            return parameter.supply(info, context);
        }

        let service = Service::typed(info.parameter_type.clone());
        context.resolve_service(&service).map_err(|e| match e {
            Error::NotRegistered { .. } => {
                Error::dependency_resolution(&self.implementation_type, info.parameter_type)
            }
            other => other,
        })
    }
}

impl fmt::Debug for ConstructorActivator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorActivator")
            .field("implementation_type", &self.implementation_type.to_string())
            .field("dependencies", &self.dependencies.len())
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl Activator for ConstructorActivator {
    fn limit_type(&self) -> &TypeDescriptor {
        &self.implementation_type
    }

    fn activate(
        &self,
        context: &mut ResolveRequestContext<'_>,
        parameters: &[Parameter],
    ) -> Result<Instance> {
        let mut arguments = Vec::with_capacity(self.dependencies.len());
        for (position, dependency) in self.dependencies.iter().enumerate() {
            let info = ParameterInfo {
                position,
                parameter_type: dependency,
            };
            arguments.push(self.resolve_dependency(context, parameters, &info)?);
        }
        trace!(
            implementation = %self.implementation_type,
            arguments = arguments.len(),
            "Invoking constructor"
        );
        (self.factory)(&self.implementation_type, arguments)
    }
}
