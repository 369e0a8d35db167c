use std::sync::Arc;

use parking_lot::RwLock;
use wirebox_domain::Service;

use crate::pipeline::{MiddlewareInsertionMode, ResolveMiddleware, ResolvePipelineBuilder};
use crate::registration::{ComponentRegistration, ServiceRegistration};

/// Whether registration sources have been consulted for a service
///
/// `Uninitialized` also covers a service whose sources ran before more
/// sources were added; only the pending ones run next time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourcesState {
    Uninitialized,
    Initializing,
    Initialized,
}

#[derive(Debug, Clone, Copy)]
struct SourcesProgress {
    state: SourcesState,
    /// Leading tracker sources already run for this service
    consulted: usize,
}

#[derive(Default)]
struct Implementations {
    /// Explicit registrations; the last one is the default
    defaults: Vec<Arc<ComponentRegistration>>,
    /// Explicit registrations added with preserved defaults
    preserved: Vec<Arc<ComponentRegistration>>,
    /// Registrations synthesized by sources, in source order
    from_sources: Vec<Arc<ComponentRegistration>>,
}

impl Implementations {
    fn is_empty(&self) -> bool {
        self.defaults.is_empty() && self.preserved.is_empty() && self.from_sources.is_empty()
    }

    fn default_registration(&self) -> Option<&Arc<ComponentRegistration>> {
        self.defaults
            .last()
            .or_else(|| self.from_sources.first())
            .or_else(|| self.preserved.first())
    }

    fn ordered(&self) -> impl Iterator<Item = &Arc<ComponentRegistration>> {
        self.defaults
            .iter()
            .rev()
            .chain(self.from_sources.iter())
            .chain(self.preserved.iter())
    }
}

/// Per-service registry state
pub(crate) struct ServiceInfo {
    service: Service,
    implementations: RwLock<Implementations>,
    sources: RwLock<SourcesProgress>,
    middleware: RwLock<ResolvePipelineBuilder>,
    merged_middleware: RwLock<Option<ResolvePipelineBuilder>>,
}

impl ServiceInfo {
    pub(crate) fn new(service: Service) -> Self {
        Self {
            service,
            implementations: RwLock::new(Implementations::default()),
            sources: RwLock::new(SourcesProgress {
                state: SourcesState::Uninitialized,
                consulted: 0,
            }),
            middleware: RwLock::new(ResolvePipelineBuilder::new()),
            merged_middleware: RwLock::new(None),
        }
    }

    pub(crate) fn add_implementation(
        &self,
        registration: Arc<ComponentRegistration>,
        preserve_defaults: bool,
        originated_from_dynamic_source: bool,
    ) {
        let mut implementations = self.implementations.write();
        if originated_from_dynamic_source {
            implementations.from_sources.push(registration);
        } else if preserve_defaults && !implementations.is_empty() {
            implementations.preserved.push(registration);
        } else {
            implementations.defaults.push(registration);
        }
    }

    pub(crate) fn default_registration(&self) -> Option<Arc<ComponentRegistration>> {
        self.implementations.read().default_registration().cloned()
    }

    pub(crate) fn registrations(&self) -> Vec<ServiceRegistration> {
        self.implementations
            .read()
            .ordered()
            .map(|r| ServiceRegistration::new(self.service.clone(), r.clone()))
            .collect()
    }

    pub(crate) fn sources_state(&self) -> SourcesState {
        self.sources.read().state
    }

    fn set_sources_state(&self, state: SourcesState) {
        self.sources.write().state = state;
    }

    /// Number of leading tracker sources already run for this service
    pub(crate) fn consulted_sources(&self) -> usize {
        self.sources.read().consulted
    }

    /// Make sources added after initialization run on the next lookup
    pub(crate) fn include_pending_sources(&self) {
        let mut progress = self.sources.write();
        if progress.state == SourcesState::Initialized {
            progress.state = SourcesState::Uninitialized;
        }
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.sources_state() == SourcesState::Initialized
    }

    pub(crate) fn add_middleware(
        &self,
        middleware: Arc<dyn ResolveMiddleware>,
        mode: MiddlewareInsertionMode,
    ) {
        self.middleware.write().use_middleware(middleware, mode);
        *self.merged_middleware.write() = None;
    }

    pub(crate) fn explicit_middleware(&self) -> ResolvePipelineBuilder {
        self.middleware.read().clone()
    }

    pub(crate) fn merged_middleware(&self) -> Option<ResolvePipelineBuilder> {
        self.merged_middleware.read().clone()
    }

    pub(crate) fn cache_merged_middleware(&self, merged: ResolvePipelineBuilder) {
        *self.merged_middleware.write() = Some(merged);
    }
}

/// Resets a service to `Uninitialized` unless source initialization completes
pub(crate) struct InitializationGuard<'a> {
    info: &'a ServiceInfo,
    completed: bool,
}

impl<'a> InitializationGuard<'a> {
    pub(crate) fn begin(info: &'a ServiceInfo) -> Self {
        info.set_sources_state(SourcesState::Initializing);
        Self {
            info,
            completed: false,
        }
    }

    /// Mark the first `consulted` tracker sources as run
    pub(crate) fn complete(mut self, consulted: usize) {
        *self.info.sources.write() = SourcesProgress {
            state: SourcesState::Initialized,
            consulted,
        };
        self.completed = true;
    }
}

impl Drop for InitializationGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.info.set_sources_state(SourcesState::Uninitialized);
        }
    }
}
