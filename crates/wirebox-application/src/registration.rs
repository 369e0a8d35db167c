//! Component registrations
//!
//! A [`ComponentRegistration`] binds one or more services to an activator
//! and a sharing mode. It is immutable once wrapped in an `Arc`: it is
//! never mutated, only superseded by later registrations. One pipeline is
//! built per requested service on first use and then reused.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use wirebox_domain::{RegistrationId, RegistrationOrigin, Service, SharingMode, TypeDescriptor};

use crate::activators::Activator;
use crate::pipeline::{
    ActivatorMiddleware, MiddlewareInsertionMode, ResolvePipeline, ResolvePipelineBuilder,
    SharingMiddleware,
};
use crate::registry::ComponentRegistryServices;

/// Describes how a component is activated and shared
pub struct ComponentRegistration {
    id: RegistrationId,
    services: Vec<Service>,
    activator: Arc<dyn Activator>,
    sharing: SharingMode,
    origin: RegistrationOrigin,
    target: Option<Arc<ComponentRegistration>>,
    metadata: BTreeMap<String, String>,
    pipeline_builder: ResolvePipelineBuilder,
    pipelines: DashMap<Service, ResolvePipeline>,
}

impl ComponentRegistration {
    /// New explicit, unique-per-request registration
    pub fn new<I>(activator: Arc<dyn Activator>, services: I) -> Self
    where
        I: IntoIterator<Item = Service>,
    {
        Self {
            id: RegistrationId::new(),
            services: services.into_iter().collect(),
            activator,
            sharing: SharingMode::default(),
            origin: RegistrationOrigin::default(),
            target: None,
            metadata: BTreeMap::new(),
            pipeline_builder: ResolvePipelineBuilder::new(),
            pipelines: DashMap::new(),
        }
    }

    /// Use a specific identity
    pub fn with_id(mut self, id: RegistrationId) -> Self {
        self.id = id;
        self
    }

    /// Set the sharing mode
    pub fn with_sharing(mut self, sharing: SharingMode) -> Self {
        self.sharing = sharing;
        self
    }

    /// Set the origin
    pub fn with_origin(mut self, origin: RegistrationOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Record the registration this one adapts or decorates
    pub fn with_target(mut self, target: Arc<ComponentRegistration>) -> Self {
        self.target = Some(target);
        self
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Use `builder` as the registration's own middleware
    pub fn with_pipeline_builder(mut self, builder: ResolvePipelineBuilder) -> Self {
        self.pipeline_builder = builder;
        self
    }

    /// Unique identity
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Services this registration provides
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    /// The activator
    pub fn activator(&self) -> &Arc<dyn Activator> {
        &self.activator
    }

    /// Most specific type produced
    pub fn limit_type(&self) -> &TypeDescriptor {
        self.activator.limit_type()
    }

    /// Sharing mode
    pub fn sharing(&self) -> SharingMode {
        self.sharing
    }

    /// Origin
    pub fn origin(&self) -> RegistrationOrigin {
        self.origin
    }

    /// Registration this one adapts or decorates, if any
    pub fn target(&self) -> Option<&Arc<ComponentRegistration>> {
        self.target.as_ref()
    }

    /// Metadata entries
    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// The registration's own middleware, before merging
    pub fn pipeline_builder(&self) -> &ResolvePipelineBuilder {
        &self.pipeline_builder
    }

    /// True once the pipeline for `service` has been assembled
    pub fn is_pipeline_built(&self, service: &Service) -> bool {
        self.pipelines.contains_key(service)
    }

    /// The assembled pipeline for resolving `service`, built on first call
    ///
    /// Starts from the registration's own middleware plus the sharing and
    /// activator stages, then adds the middleware the registry holds for
    /// `service` only. Service middleware keeps its insertion mode.
    pub fn resolve_pipeline(
        &self,
        service: &Service,
        registry: &dyn ComponentRegistryServices,
    ) -> ResolvePipeline {
        if let Some(pipeline) = self.pipelines.get(service) {
            return pipeline.clone();
        }

        let mut builder = self.pipeline_builder.clone();
        builder.use_middleware(Arc::new(SharingMiddleware), MiddlewareInsertionMode::StartOfPhase);
        builder.use_middleware(
            Arc::new(ActivatorMiddleware::new(self.activator.clone())),
            MiddlewareInsertionMode::EndOfPhase,
        );
        builder.use_builder(&registry.service_middleware_for(service));

        self.pipelines
            .entry(service.clone())
            .or_insert_with(|| builder.build())
            .clone()
    }
}

impl fmt::Display for ComponentRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activator = {}, Services = [", self.limit_type())?;
        for (i, service) in self.services.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{service}")?;
        }
        write!(f, "], Sharing = {}, Origin = {}", self.sharing, self.origin)
    }
}

impl fmt::Debug for ComponentRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistration")
            .field("id", &self.id)
            .field("limit_type", &self.limit_type().to_string())
            .field("services", &self.services)
            .field("sharing", &self.sharing)
            .field("origin", &self.origin)
            .field("target", &self.target.as_ref().map(|t| t.id()))
            .finish()
    }
}

/// Registration settings shared by every registration a source synthesizes
#[derive(Debug, Clone, Default)]
pub struct RegistrationData {
    /// Services provided (open forms for open-generic sources)
    pub services: Vec<Service>,
    /// Sharing mode for synthesized registrations
    pub sharing: SharingMode,
    /// Metadata copied onto synthesized registrations
    pub metadata: BTreeMap<String, String>,
}

impl RegistrationData {
    /// Data for the given services with default sharing
    pub fn new<I>(services: I) -> Self
    where
        I: IntoIterator<Item = Service>,
    {
        Self {
            services: services.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Set the sharing mode
    pub fn with_sharing(mut self, sharing: SharingMode) -> Self {
        self.sharing = sharing;
        self
    }

    /// Create a registration from this data with a fresh identity
    pub fn create_registration(
        &self,
        activator: Arc<dyn Activator>,
        pipeline_builder: ResolvePipelineBuilder,
        services: Vec<Service>,
        origin: RegistrationOrigin,
    ) -> ComponentRegistration {
        let registration = ComponentRegistration::new(activator, services)
            .with_sharing(self.sharing)
            .with_origin(origin)
            .with_pipeline_builder(pipeline_builder);
        self.metadata
            .iter()
            .fold(registration, |r, (k, v)| r.with_metadata(k.clone(), v.clone()))
    }
}

/// A service paired with the registration selected to satisfy it
#[derive(Debug, Clone)]
pub struct ServiceRegistration {
    /// The requested service
    pub service: Service,
    /// The registration satisfying it
    pub registration: Arc<ComponentRegistration>,
}

impl ServiceRegistration {
    /// Pair a service with a registration
    pub fn new(service: Service, registration: Arc<ComponentRegistration>) -> Self {
        Self {
            service,
            registration,
        }
    }
}
