//! Services tracker
//!
//! The registry proper. Mutation (`add_*`) belongs to container assembly;
//! after that the tracker is read concurrently. The only state written
//! during resolution is the per-service count of consulted sources and the
//! registrations sources synthesize, both behind one reentrant lock so a
//! source runs at most once per service even when requests race.

use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{ReentrantMutex, RwLock};
use tracing::{debug, trace};
use wirebox_domain::{Error, RegistrationId, Result, Service};

use super::service_info::{InitializationGuard, ServiceInfo, SourcesState};
use super::{ComponentRegistryServices, RegistrationSource, ServiceMiddlewareSource};
use crate::observers::{ObserverList, SubscriptionId};
use crate::pipeline::{MiddlewareInsertionMode, ResolveMiddleware, ResolvePipelineBuilder};
use crate::registration::{ComponentRegistration, ServiceRegistration};

#[derive(Default)]
struct RegistrationSet {
    ordered: Vec<Arc<ComponentRegistration>>,
    ids: HashSet<RegistrationId>,
}

/// Keeps track of registered services, sources and service middleware
pub struct ServicesTracker {
    service_info: DashMap<Service, Arc<ServiceInfo>>,
    registrations: RwLock<RegistrationSet>,
    sources: RwLock<Vec<Arc<dyn RegistrationSource>>>,
    middleware_sources: RwLock<Vec<Arc<dyn ServiceMiddlewareSource>>>,
    source_initialization: ReentrantMutex<()>,
    registered: ObserverList<Arc<ComponentRegistration>>,
    registration_source_added: ObserverList<Arc<dyn RegistrationSource>>,
}

impl ServicesTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            service_info: DashMap::new(),
            registrations: RwLock::new(RegistrationSet::default()),
            sources: RwLock::new(Vec::new()),
            middleware_sources: RwLock::new(Vec::new()),
            source_initialization: ReentrantMutex::new(()),
            registered: ObserverList::new(),
            registration_source_added: ObserverList::new(),
        }
    }

    fn service_info(&self, service: &Service) -> Arc<ServiceInfo> {
        if let Some(info) = self.service_info.get(service) {
            return info.clone();
        }
        self.service_info
            .entry(service.clone())
            .or_insert_with(|| Arc::new(ServiceInfo::new(service.clone())))
            .clone()
    }

    /// Add a registration under each of its services
    ///
    /// Without `preserve_defaults` the registration becomes the default for
    /// its services; with it, an existing default is kept and this
    /// registration becomes an alternative. Fails if the identity is
    /// already registered.
    ///
    /// An explicit registration added after adapter sources have run for
    /// some service is adapted on the spot, so those services also see it.
    pub fn add_registration(
        &self,
        registration: Arc<ComponentRegistration>,
        preserve_defaults: bool,
        originated_from_dynamic_source: bool,
    ) -> Result<()> {
        let _lock = self.source_initialization.lock();
        if self.registrations.read().ids.contains(&registration.id()) {
            return Err(Error::invalid_operation(format!(
                "Registration {} has already been added",
                registration.id()
            )));
        }
        let adapters = if originated_from_dynamic_source {
            Vec::new()
        } else {
            self.adapt_late_registration(&registration)?
        };

        {
            let mut registrations = self.registrations.write();
            registrations.ids.insert(registration.id());
            registrations.ordered.push(registration.clone());
        }
        self.index_registration(&registration, preserve_defaults, originated_from_dynamic_source);
        self.registered.notify(&registration);

        self.commit_dynamic(&adapters)?;
        self.notify_registered(&adapters);
        Ok(())
    }

    fn index_registration(
        &self,
        registration: &Arc<ComponentRegistration>,
        preserve_defaults: bool,
        originated_from_dynamic_source: bool,
    ) {
        for service in registration.services() {
            self.service_info(service).add_implementation(
                registration.clone(),
                preserve_defaults,
                originated_from_dynamic_source,
            );
        }
        debug!(
            id = %registration.id(),
            registration = %registration,
            dynamic = originated_from_dynamic_source,
            "Component registered"
        );
    }

    /// Adapters for `registration` on every service whose adapter sources
    /// already ran
    fn adapt_late_registration(
        &self,
        registration: &Arc<ComponentRegistration>,
    ) -> Result<Vec<Arc<ComponentRegistration>>> {
        let sources = self.sources();
        if !sources.iter().any(|s| s.is_adapter_for_individual_components()) {
            return Ok(Vec::new());
        }

        let initialized: Vec<Service> = self
            .service_info
            .iter()
            .filter(|entry| {
                entry.value().consulted_sources() > 0
                    && !registration.services().contains(entry.key())
            })
            .map(|entry| entry.key().clone())
            .collect();

        let sandbox = AdaptationSandbox {
            tracker: self,
            registration,
            sources,
            adapters: RefCell::new(Vec::new()),
        };
        for service in &initialized {
            sandbox.adapters_for(service)?;
        }
        let adapters = sandbox.into_adapters();
        if !adapters.is_empty() {
            debug!(
                registration = %registration,
                count = adapters.len(),
                "Late registration adapted"
            );
        }
        Ok(adapters)
    }

    /// Append a registration source; earlier sources are consulted first
    ///
    /// Services whose sources already ran will consult the new source on
    /// their next lookup.
    pub fn add_registration_source(&self, source: Arc<dyn RegistrationSource>) {
        debug!(source = %source, "Registration source added");
        {
            let _lock = self.source_initialization.lock();
            self.sources.write().push(source.clone());
            for entry in &self.service_info {
                entry.value().include_pending_sources();
            }
        }
        self.registration_source_added.notify(&source);
    }

    /// Attach middleware to one service
    pub fn add_service_middleware(
        &self,
        service: &Service,
        middleware: Arc<dyn ResolveMiddleware>,
        insertion_mode: MiddlewareInsertionMode,
    ) {
        trace!(service = %service, middleware = %middleware, "Service middleware added");
        self.service_info(service)
            .add_middleware(middleware, insertion_mode);
    }

    /// Append a service middleware source
    pub fn add_service_middleware_source(&self, source: Arc<dyn ServiceMiddlewareSource>) {
        self.middleware_sources.write().push(source);
    }

    /// Subscribe to registration notifications
    pub fn on_registered<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Arc<ComponentRegistration>) + Send + Sync + 'static,
    {
        self.registered.subscribe(handler)
    }

    /// Subscribe to registration-source notifications
    pub fn on_registration_source_added<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Arc<dyn RegistrationSource>) + Send + Sync + 'static,
    {
        self.registration_source_added.subscribe(handler)
    }

    /// Every registration, explicit and dynamic, in insertion order
    pub fn registrations(&self) -> Vec<Arc<ComponentRegistration>> {
        self.registrations.read().ordered.clone()
    }

    /// Registration sources, in priority order
    pub fn sources(&self) -> Vec<Arc<dyn RegistrationSource>> {
        self.sources.read().clone()
    }

    /// Service middleware sources
    pub fn service_middleware_sources(&self) -> Vec<Arc<dyn ServiceMiddlewareSource>> {
        self.middleware_sources.read().clone()
    }

    fn initialize_from_sources(&self, service: &Service, info: &ServiceInfo) -> Result<()> {
        let guard = InitializationGuard::begin(info);
        let sources = self.sources();
        let pending = sources.get(info.consulted_sources()..).unwrap_or_default();
        let accessor = |s: &Service| self.service_registrations_for(s);

        let mut produced: Vec<Arc<ComponentRegistration>> = Vec::new();
        for source in pending {
            let registrations = source.registrations_for(service, &accessor)?;
            trace!(
                service = %service,
                source = %source,
                count = registrations.len(),
                "Registration source consulted"
            );
            produced.extend(registrations);
        }

        self.commit_dynamic(&produced)?;
        guard.complete(sources.len());
        self.notify_registered(&produced);
        Ok(())
    }

    /// Record source-produced registrations; all or nothing
    fn commit_dynamic(&self, produced: &[Arc<ComponentRegistration>]) -> Result<()> {
        {
            let mut registrations = self.registrations.write();
            let mut incoming = HashSet::new();
            if let Some(duplicate) = produced
                .iter()
                .find(|r| registrations.ids.contains(&r.id()) || !incoming.insert(r.id()))
            {
                return Err(Error::invalid_operation(format!(
                    "Registration {} has already been added",
                    duplicate.id()
                )));
            }
            registrations.ids.extend(incoming);
            registrations.ordered.extend(produced.iter().cloned());
        }

        for registration in produced {
            self.index_registration(registration, false, true);
        }
        Ok(())
    }

    fn notify_registered(&self, produced: &[Arc<ComponentRegistration>]) {
        for registration in produced {
            self.registered.notify(registration);
        }
    }
}

/// Runs adapter sources against a single registration
///
/// The accessor handed to sources sees only that registration and the
/// adapters built from it so far, never the rest of the registry. Each
/// service only uses the sources the tracker already ran for it; pending
/// sources will see the registration through the normal lookup.
struct AdaptationSandbox<'a> {
    tracker: &'a ServicesTracker,
    registration: &'a Arc<ComponentRegistration>,
    sources: Vec<Arc<dyn RegistrationSource>>,
    adapters: RefCell<Vec<(Service, Vec<Arc<ComponentRegistration>>)>>,
}

impl AdaptationSandbox<'_> {
    fn adapters_for(&self, service: &Service) -> Result<Vec<Arc<ComponentRegistration>>> {
        if let Some((_, found)) = self.adapters.borrow().iter().find(|(s, _)| s == service) {
            return Ok(found.clone());
        }
        // Placeholder cuts adapter cycles short.
        self.adapters.borrow_mut().push((service.clone(), Vec::new()));

        let consulted = self
            .tracker
            .service_info
            .get(service)
            .map_or(0, |info| info.consulted_sources());
        let accessor = |s: &Service| self.registrations_for(s);
        let mut produced = Vec::new();
        for source in self
            .sources
            .iter()
            .take(consulted)
            .filter(|s| s.is_adapter_for_individual_components())
        {
            produced.extend(source.registrations_for(service, &accessor)?);
        }

        if let Some((_, slot)) = self
            .adapters
            .borrow_mut()
            .iter_mut()
            .find(|(s, _)| s == service)
        {
            slot.clone_from(&produced);
        }
        Ok(produced)
    }

    fn registrations_for(&self, service: &Service) -> Result<Vec<ServiceRegistration>> {
        let found = if self.registration.services().contains(service) {
            vec![self.registration.clone()]
        } else {
            self.adapters_for(service)?
        };
        Ok(found
            .into_iter()
            .map(|r| ServiceRegistration::new(service.clone(), r))
            .collect())
    }

    fn into_adapters(self) -> Vec<Arc<ComponentRegistration>> {
        self.adapters
            .into_inner()
            .into_iter()
            .flat_map(|(_, adapters)| adapters)
            .collect()
    }
}

impl Default for ServicesTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistryServices for ServicesTracker {
    fn try_get_service_registration(&self, service: &Service) -> Option<ServiceRegistration> {
        let info = self.service_info.get(service).map(|i| i.clone())?;
        info.default_registration()
            .map(|r| ServiceRegistration::new(service.clone(), r))
    }

    fn service_registrations_for(&self, service: &Service) -> Result<Vec<ServiceRegistration>> {
        let info = self.service_info(service);
        if info.is_initialized() {
            return Ok(info.registrations());
        }

        let _lock = self.source_initialization.lock();
        // Initializing here means a source on this thread asked for the
        // service it is currently providing.
        if info.sources_state() == SourcesState::Uninitialized {
            self.initialize_from_sources(service, &info)?;
        }
        Ok(info.registrations())
    }

    fn service_middleware_for(&self, service: &Service) -> ResolvePipelineBuilder {
        let info = self.service_info(service);
        if let Some(merged) = info.merged_middleware() {
            return merged;
        }

        let mut builder = info.explicit_middleware();
        for source in self.service_middleware_sources() {
            source.provide_middleware(service, self, &mut builder);
        }
        info.cache_merged_middleware(builder.clone());
        builder
    }
}
