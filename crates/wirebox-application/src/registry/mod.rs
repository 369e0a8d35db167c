//! Component Registry
//!
//! Tracks explicit registrations, dynamic registration sources and
//! per-service middleware.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Registration Lookup                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  1. Caller asks:   service_registrations_for(IHandler<i32>)     │
//! │                              ↓                                  │
//! │  2. Pending?       run sources not yet run for it, in order     │
//! │                    (sources may query other services)           │
//! │                              ↓                                  │
//! │  3. Register:      add_registration(.., dynamic = true)         │
//! │                              ↓                                  │
//! │  4. Return:        default first, then alternatives             │
//! │                                                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod service_info;
mod tracker;

use std::fmt;
use std::sync::Arc;

use wirebox_domain::{Result, Service};

use crate::pipeline::ResolvePipelineBuilder;
use crate::registration::{ComponentRegistration, ServiceRegistration};

pub use tracker::ServicesTracker;

/// Callback into the registry handed to registration sources
pub type RegistrationAccessor<'a> = &'a dyn Fn(&Service) -> Result<Vec<ServiceRegistration>>;

/// Read access to registered services
pub trait ComponentRegistryServices: Send + Sync {
    /// The current default registration, without invoking sources
    fn try_get_service_registration(&self, service: &Service) -> Option<ServiceRegistration>;

    /// All registrations for `service`, default first, after making sure
    /// every registration source has been consulted for it
    fn service_registrations_for(&self, service: &Service) -> Result<Vec<ServiceRegistration>>;

    /// Whether any registration, explicit or dynamic, provides `service`
    fn is_registered(&self, service: &Service) -> Result<bool> {
        Ok(!self.service_registrations_for(service)?.is_empty())
    }

    /// Merged middleware that applies to `service`, with insertion modes
    fn service_middleware_for(&self, service: &Service) -> ResolvePipelineBuilder;
}

/// Synthesizes registrations on demand
pub trait RegistrationSource: Send + Sync + fmt::Display {
    /// Registrations that can provide `service`; may be empty
    ///
    /// `accessor` reaches back into the registry, so a source can build on
    /// registrations for other services, including synthesized ones.
    fn registrations_for(
        &self,
        service: &Service,
        accessor: RegistrationAccessor<'_>,
    ) -> Result<Vec<Arc<ComponentRegistration>>>;

    /// True when each result adapts one specific underlying component
    ///
    /// When an explicit registration arrives after such a source has run
    /// for a service, the tracker runs the source again with an accessor
    /// that only exposes the new registration, and adds what it returns.
    /// Other sources only ever see a service once.
    fn is_adapter_for_individual_components(&self) -> bool;
}

/// Contributes middleware to services on demand
pub trait ServiceMiddlewareSource: Send + Sync {
    /// Add any middleware that should apply to `service` into `builder`
    fn provide_middleware(
        &self,
        service: &Service,
        registry: &dyn ComponentRegistryServices,
        builder: &mut ResolvePipelineBuilder,
    );
}
