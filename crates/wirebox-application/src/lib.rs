//! Application Layer - wirebox resolution core
//!
//! This crate turns a request for a [`Service`](wirebox_domain::Service) into
//! an instance. It owns the registry of component registrations, the dynamic
//! registration sources that synthesize registrations on demand, the
//! middleware pipeline each registration is activated through, and the
//! per-request resolve operation that detects circular dependencies.
//!
//! ## Architecture
//!
//! ```text
//! LifetimeScope::resolve_service(service)
//!        │
//!        ▼
//! ResolveOperation ──► ServicesTracker::service_registrations_for
//!        │                     │ (sources run once per service)
//!        │                     ▼
//!        │             RegistrationSource::registrations_for
//!        ▼
//! ComponentRegistration::resolve_pipeline ──► middleware … ──► Activator
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`registry`] | Services tracker, registration and middleware sources |
//! | [`registration`] | Immutable component registrations |
//! | [`pipeline`] | Phased middleware pipeline |
//! | [`resolving`] | Resolve operation, request context, lifetime scopes |
//! | [`features`] | Open-generic decorator registration source |
//! | [`activators`] | Activator contract and stock activators |
//! | [`diagnostics`] | Tracer contract and per-operation trace collection |

pub mod activators;
pub mod diagnostics;
pub mod features;
pub mod observers;
pub mod parameters;
pub mod pipeline;
pub mod registration;
pub mod registry;
pub mod resolving;

pub use activators::{
    Activator, ConstructorActivator, ConstructorFactory, DelegateActivator, Instance,
    ProvidedInstanceActivator,
};
pub use diagnostics::{
    DiagnosticTracer, EventLogTraceBuilder, OperationTraceCompleted, OperationTracer, TraceBuilder,
    TraceEvent,
};
pub use features::open_generics::{
    OpenGenericDecoratorActivatorData, OpenGenericDecoratorRegistrationSource,
    OpenGenericServiceBinder,
};
pub use observers::{ObserverList, SubscriptionId};
pub use parameters::{Parameter, ParameterInfo};
pub use pipeline::{
    ActivatorMiddleware, DelegateMiddleware, MiddlewareInsertionMode, Next, PipelinePhase,
    ResolveMiddleware, ResolvePipeline, ResolvePipelineBuilder, SharingMiddleware,
};
pub use registration::{ComponentRegistration, RegistrationData, ServiceRegistration};
pub use registry::{
    ComponentRegistryServices, RegistrationAccessor, RegistrationSource, ServiceMiddlewareSource,
    ServicesTracker,
};
pub use resolving::{
    LifetimeScope, OperationInfo, OperationState, ResolveOperation, ResolveRequest,
    ResolveRequestContext, ScopeOptions,
};
