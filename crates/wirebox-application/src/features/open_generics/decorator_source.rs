use std::fmt;
use std::sync::Arc;

use tracing::trace;
use wirebox_domain::{Error, RegistrationOrigin, Result, Service, TypeDescriptor};

use super::binder::OpenGenericServiceBinder;
use crate::activators::{ConstructorActivator, ConstructorFactory};
use crate::parameters::Parameter;
use crate::pipeline::ResolvePipelineBuilder;
use crate::registration::{ComponentRegistration, RegistrationData, ServiceRegistration};
use crate::registry::{RegistrationAccessor, RegistrationSource};
use crate::resolving::ResolveRequest;

/// How an open-generic decorator is constructed
#[derive(Clone)]
pub struct OpenGenericDecoratorActivatorData {
    /// Open decorator type, e.g. `Logging<T>`
    pub implementation_type: TypeDescriptor,
    /// Open service being decorated, e.g. `IHandler<T> (implementor)`
    pub from_service: Service,
    /// Open constructor dependencies; the decorated one uses the to-service type
    pub dependencies: Vec<TypeDescriptor>,
    /// Parameters applied after the decorated-component parameter
    pub configured_parameters: Vec<Parameter>,
    /// Builds the decorator from its resolved dependencies
    pub factory: ConstructorFactory,
}

impl OpenGenericDecoratorActivatorData {
    /// Decorator data with no configured parameters
    pub fn new<I>(
        implementation_type: TypeDescriptor,
        from_service: Service,
        dependencies: I,
        factory: ConstructorFactory,
    ) -> Self
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        Self {
            implementation_type,
            from_service,
            dependencies: dependencies.into_iter().collect(),
            configured_parameters: Vec::new(),
            factory,
        }
    }

    /// Replace the configured parameters
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.configured_parameters = parameters;
        self
    }
}

impl fmt::Debug for OpenGenericDecoratorActivatorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenGenericDecoratorActivatorData")
            .field("implementation_type", &self.implementation_type.to_string())
            .field("from_service", &self.from_service)
            .field("dependencies", &self.dependencies.len())
            .field("configured_parameters", &self.configured_parameters)
            .finish()
    }
}

/// Synthesizes closed decorator registrations for an open-generic decorator
///
/// For a requested `IHandler<i32>` the source closes the decorator to
/// `Logging<i32>`, looks up every registration of the concrete from-service
/// and emits one decorator registration per decorated component. Each one
/// resolves exactly the component it wraps.
pub struct OpenGenericDecoratorRegistrationSource {
    registration_data: RegistrationData,
    activator_data: OpenGenericDecoratorActivatorData,
    existing_pipeline: ResolvePipelineBuilder,
}

impl OpenGenericDecoratorRegistrationSource {
    /// Create the source, validating the open-generic declarations
    pub fn new(
        registration_data: RegistrationData,
        existing_pipeline_builder: ResolvePipelineBuilder,
        activator_data: OpenGenericDecoratorActivatorData,
    ) -> Result<Self> {
        OpenGenericServiceBinder::enforce_bindable(
            &activator_data.implementation_type,
            &registration_data.services,
        )?;

        if registration_data
            .services
            .contains(&activator_data.from_service)
        {
            return Err(Error::configuration(format!(
                "The from-service '{}' of a decorator must differ from every to-service",
                activator_data.from_service
            )));
        }

        Ok(Self {
            registration_data,
            activator_data,
            existing_pipeline: existing_pipeline_builder,
        })
    }

    fn decorated_component_parameter(
        from_service: Service,
        decorated_type: TypeDescriptor,
        decorated: ServiceRegistration,
    ) -> Parameter {
        Parameter::resolved(
            move |info| *info.parameter_type == decorated_type,
            move |_, context| {
                context.resolve_component(ResolveRequest::new(
                    from_service.clone(),
                    decorated.registration.clone(),
                ))
            },
        )
    }
}

impl RegistrationSource for OpenGenericDecoratorRegistrationSource {
    fn registrations_for(
        &self,
        service: &Service,
        accessor: RegistrationAccessor<'_>,
    ) -> Result<Vec<Arc<ComponentRegistration>>> {
        let Some(bound) = OpenGenericServiceBinder::try_bind(
            service,
            &self.registration_data.services,
            &self.activator_data.implementation_type,
        ) else {
            return Ok(Vec::new());
        };

        let requested_type = service.service_type().clone();
        let from_service = self.activator_data.from_service.change_type(requested_type.clone());
        let dependencies = self
            .activator_data
            .dependencies
            .iter()
            .map(|d| d.substitute(&bound.bindings))
            .collect::<Result<Vec<_>>>()?;

        let decorated = accessor(&from_service)?;
        trace!(
            service = %service,
            decorator = %bound.implementation,
            candidates = decorated.len(),
            "Closing open-generic decorator"
        );

        Ok(decorated
            .into_iter()
            .map(|inner| {
                let target = inner.registration.clone();
                let parameters = std::iter::once(Self::decorated_component_parameter(
                    from_service.clone(),
                    requested_type.clone(),
                    inner,
                ))
                .chain(self.activator_data.configured_parameters.iter().cloned())
                .collect();

                let activator = ConstructorActivator::new(
                    bound.implementation.clone(),
                    dependencies.clone(),
                    self.activator_data.factory.clone(),
                )
                .with_parameters(parameters);

                Arc::new(
                    self.registration_data
                        .create_registration(
                            Arc::new(activator),
                            self.existing_pipeline.clone(),
                            bound.services.clone(),
                            RegistrationOrigin::DynamicSource,
                        )
                        .with_target(target),
                )
            })
            .collect())
    }

    fn is_adapter_for_individual_components(&self) -> bool {
        true
    }
}

impl fmt::Display for OpenGenericDecoratorRegistrationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} decorating {} -> ",
            self.activator_data.implementation_type, self.activator_data.from_service
        )?;
        for (i, service) in self.registration_data.services.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{service}")?;
        }
        Ok(())
    }
}
