use std::sync::Arc;

use wirebox_domain::Service;

use crate::parameters::Parameter;
use crate::registration::{ComponentRegistration, ServiceRegistration};

/// A request for one service, pinned to the registration that satisfies it
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    service: Service,
    registration: Arc<ComponentRegistration>,
    parameters: Vec<Parameter>,
}

impl ResolveRequest {
    /// Request `service` from `registration` without parameters
    pub fn new(service: Service, registration: Arc<ComponentRegistration>) -> Self {
        Self {
            service,
            registration,
            parameters: Vec::new(),
        }
    }

    /// Supply parameters for the activator
    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// The requested service
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// The registration that will be activated
    pub fn registration(&self) -> &Arc<ComponentRegistration> {
        &self.registration
    }

    /// Request parameters
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub(crate) fn into_parts(self) -> (Service, Arc<ComponentRegistration>, Vec<Parameter>) {
        (self.service, self.registration, self.parameters)
    }
}

impl From<ServiceRegistration> for ResolveRequest {
    fn from(value: ServiceRegistration) -> Self {
        Self::new(value.service, value.registration)
    }
}
