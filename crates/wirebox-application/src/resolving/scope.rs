use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;
use wirebox_domain::constants::DEFAULT_MAX_RESOLVE_DEPTH;
use wirebox_domain::{Error, RegistrationId, Result, Service};

use super::operation::ResolveOperation;
use super::request::ResolveRequest;
use crate::activators::Instance;
use crate::diagnostics::DiagnosticTracer;
use crate::registry::ComponentRegistryServices;

/// Settings applied to a root scope and inherited by its children
#[derive(Clone)]
pub struct ScopeOptions {
    /// Tracer attached to every operation started from the scope
    pub tracer: Option<Arc<dyn DiagnosticTracer>>,
    /// Maximum nesting of resolve requests within one operation
    pub max_resolve_depth: usize,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        Self {
            tracer: None,
            max_resolve_depth: DEFAULT_MAX_RESOLVE_DEPTH,
        }
    }
}

impl fmt::Debug for ScopeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeOptions")
            .field("tracer", &self.tracer.is_some())
            .field("max_resolve_depth", &self.max_resolve_depth)
            .finish()
    }
}

type SharedSlot = Arc<OnceCell<Instance>>;

struct ScopeInner {
    id: Uuid,
    registry: Arc<dyn ComponentRegistryServices>,
    parent: Option<LifetimeScope>,
    shared: DashMap<RegistrationId, SharedSlot>,
    tracer: RwLock<Option<Arc<dyn DiagnosticTracer>>>,
    max_resolve_depth: usize,
}

/// Owner of shared instances and entry point for resolution
///
/// The root scope owns singletons; each child scope owns the instances
/// registered as shared-in-scope that were resolved through it. Cloning a
/// scope yields another handle to the same scope.
#[derive(Clone)]
pub struct LifetimeScope {
    inner: Arc<ScopeInner>,
}

impl LifetimeScope {
    /// Root scope over `registry` with default options
    pub fn root(registry: Arc<dyn ComponentRegistryServices>) -> Self {
        Self::root_with(registry, ScopeOptions::default())
    }

    /// Root scope over `registry`
    pub fn root_with(registry: Arc<dyn ComponentRegistryServices>, options: ScopeOptions) -> Self {
        Self::create(registry, None, options)
    }

    fn create(
        registry: Arc<dyn ComponentRegistryServices>,
        parent: Option<LifetimeScope>,
        options: ScopeOptions,
    ) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                id: Uuid::new_v4(),
                registry,
                parent,
                shared: DashMap::new(),
                tracer: RwLock::new(options.tracer),
                max_resolve_depth: options.max_resolve_depth,
            }),
        }
    }

    /// Child scope inheriting the registry, tracer and depth limit
    pub fn begin_lifetime_scope(&self) -> Self {
        let child = Self::create(
            self.inner.registry.clone(),
            Some(self.clone()),
            ScopeOptions {
                tracer: self.tracer(),
                max_resolve_depth: self.inner.max_resolve_depth,
            },
        );
        debug!(parent = %self.inner.id, scope = %child.inner.id, "Lifetime scope started");
        child
    }

    /// Scope identity
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// True for the root scope
    pub fn is_root(&self) -> bool {
        self.inner.parent.is_none()
    }

    /// The root of this scope's hierarchy
    pub fn root_scope(&self) -> LifetimeScope {
        let mut scope = self;
        while let Some(parent) = &scope.inner.parent {
            scope = parent;
        }
        scope.clone()
    }

    /// Registry this scope resolves from
    pub fn registry(&self) -> &Arc<dyn ComponentRegistryServices> {
        &self.inner.registry
    }

    /// Tracer attached to operations started from this scope
    pub fn tracer(&self) -> Option<Arc<dyn DiagnosticTracer>> {
        self.inner.tracer.read().clone()
    }

    /// Attach a tracer to operations started from now on
    ///
    /// Child scopes created afterwards inherit it.
    pub fn attach_tracer(&self, tracer: Arc<dyn DiagnosticTracer>) {
        *self.inner.tracer.write() = Some(tracer);
    }

    /// Maximum nesting of resolve requests per operation
    pub fn max_resolve_depth(&self) -> usize {
        self.inner.max_resolve_depth
    }

    /// Number of shared instances this scope owns
    pub fn shared_instance_count(&self) -> usize {
        self.inner
            .shared
            .iter()
            .filter(|slot| slot.value().get().is_some())
            .count()
    }

    /// Return the instance this scope shares for `registration`, creating
    /// it with `create` on first use
    ///
    /// Concurrent first requests for the same registration activate it
    /// once; the others wait and receive the same instance. A failed
    /// creation leaves the slot empty so a later request can retry.
    pub fn get_or_create_shared<F>(&self, registration: RegistrationId, create: F) -> Result<Instance>
    where
        F: FnOnce() -> Result<Instance>,
    {
        let slot = self.inner.shared.entry(registration).or_default().clone();
        slot.get_or_try_init(create).cloned()
    }

    /// Whether `service` can be resolved; consults registration sources
    pub fn is_registered(&self, service: &Service) -> Result<bool> {
        self.inner.registry.is_registered(service)
    }

    /// Resolve the default registration of `service`
    pub fn resolve_service(&self, service: &Service) -> Result<Instance> {
        let registration = self
            .inner
            .registry
            .service_registrations_for(service)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_registered(service))?;
        self.resolve_request(registration.into())
    }

    /// Resolve every registration of `service`, default first
    pub fn resolve_all(&self, service: &Service) -> Result<Vec<Instance>> {
        self.inner
            .registry
            .service_registrations_for(service)?
            .into_iter()
            .map(|registration| self.resolve_request(registration.into()))
            .collect()
    }

    /// Run a new operation for `request`
    pub fn resolve_request(&self, request: ResolveRequest) -> Result<Instance> {
        ResolveOperation::new(self.clone()).execute(request)
    }

    /// Resolve `service` and downcast the instance to `T`
    pub fn resolve<T>(&self, service: &Service) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        self.resolve_service(service)?
            .downcast::<T>()
            .map_err(|_| Error::type_mismatch(std::any::type_name::<T>(), service))
    }
}

impl fmt::Debug for LifetimeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifetimeScope")
            .field("id", &self.inner.id)
            .field("is_root", &self.is_root())
            .field("shared", &self.inner.shared.len())
            .finish()
    }
}
