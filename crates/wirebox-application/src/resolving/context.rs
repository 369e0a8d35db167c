use std::fmt;
use std::sync::Arc;

use wirebox_domain::{Error, Result, Service};

use super::operation::{OperationInfo, ResolveOperation};
use super::request::ResolveRequest;
use super::scope::LifetimeScope;
use crate::activators::Instance;
use crate::diagnostics::DiagnosticTracer;
use crate::parameters::Parameter;
use crate::pipeline::PipelinePhase;
use crate::registration::ComponentRegistration;
use crate::registry::ComponentRegistryServices;

/// State of one request while it travels through a registration pipeline
///
/// Middleware reads and rewrites the request here; the activator stores
/// the produced instance. Nested resolves go back through the owning
/// operation so they share its request stack.
pub struct ResolveRequestContext<'op> {
    operation: &'op mut ResolveOperation,
    service: Service,
    registration: Arc<ComponentRegistration>,
    parameters: Vec<Parameter>,
    scope: LifetimeScope,
    instance: Option<Instance>,
    phase_reached: PipelinePhase,
    new_instance_activated: bool,
}

impl<'op> ResolveRequestContext<'op> {
    pub(crate) fn new(
        operation: &'op mut ResolveOperation,
        scope: LifetimeScope,
        request: ResolveRequest,
    ) -> Self {
        let (service, registration, parameters) = request.into_parts();
        Self {
            operation,
            service,
            registration,
            parameters,
            scope,
            instance: None,
            phase_reached: PipelinePhase::ResolveRequestStart,
            new_instance_activated: false,
        }
    }

    /// The requested service
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// The registration being activated
    pub fn registration(&self) -> &Arc<ComponentRegistration> {
        &self.registration
    }

    /// Parameters passed to the activator
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Replace the activator parameters
    pub fn change_parameters(&mut self, parameters: Vec<Parameter>) {
        self.parameters = parameters;
    }

    /// The scope the request runs in
    pub fn scope(&self) -> &LifetimeScope {
        &self.scope
    }

    /// Move the rest of the request to another scope
    pub fn change_scope(&mut self, scope: LifetimeScope) {
        self.scope = scope;
    }

    /// The instance produced so far, if any
    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    /// Set (or replace) the produced instance
    pub fn set_instance(&mut self, instance: Instance) {
        self.instance = Some(instance);
    }

    pub(crate) fn take_instance(&mut self) -> Option<Instance> {
        self.instance.take()
    }

    /// Latest pipeline phase entered
    pub fn phase_reached(&self) -> PipelinePhase {
        self.phase_reached
    }

    pub(crate) fn set_phase_reached(&mut self, phase: PipelinePhase) {
        self.phase_reached = phase;
    }

    /// True if this request activated a new instance rather than reusing one
    pub fn new_instance_activated(&self) -> bool {
        self.new_instance_activated
    }

    pub(crate) fn mark_new_instance_activated(&mut self) {
        self.new_instance_activated = true;
    }

    /// The operation this request belongs to
    pub fn operation_info(&self) -> &OperationInfo {
        self.operation.info()
    }

    /// Tracer attached to the operation
    pub fn tracer(&self) -> Option<Arc<dyn DiagnosticTracer>> {
        self.operation.tracer().cloned()
    }

    /// Registry the scope resolves from
    pub fn registry(&self) -> &Arc<dyn ComponentRegistryServices> {
        self.scope.registry()
    }

    /// Resolve another service within the same operation
    pub fn resolve_service(&mut self, service: &Service) -> Result<Instance> {
        let registration = self
            .scope
            .registry()
            .service_registrations_for(service)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_registered(service))?;
        self.resolve_component(registration.into())
    }

    /// Resolve a request pinned to a specific registration within the same
    /// operation
    pub fn resolve_component(&mut self, request: ResolveRequest) -> Result<Instance> {
        let scope = self.scope.clone();
        self.operation.get_or_create_instance(scope, request)
    }
}

impl fmt::Debug for ResolveRequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveRequestContext")
            .field("operation", &self.operation.info().id)
            .field("service", &self.service)
            .field("registration", &self.registration.id())
            .field("phase_reached", &self.phase_reached)
            .finish()
    }
}
