use std::fmt;
use std::sync::Arc;

use wirebox_domain::{Error, Result, SharingMode};

use super::{Next, PipelinePhase, ResolveMiddleware};
use crate::activators::Activator;
use crate::resolving::ResolveRequestContext;

/// Returns the shared instance for singleton and scoped registrations,
/// activating it at most once per owning scope
#[derive(Debug, Default)]
pub struct SharingMiddleware;

impl fmt::Display for SharingMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharingMiddleware")
    }
}

impl ResolveMiddleware for SharingMiddleware {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Sharing
    }

    fn execute(&self, context: &mut ResolveRequestContext<'_>, next: Next<'_>) -> Result<()> {
        let registration = context.registration().clone();
        let owner = match registration.sharing() {
            SharingMode::UniquePerRequest => return next.run(context),
            SharingMode::SharedInScope => context.scope().clone(),
            SharingMode::Singleton => context.scope().root_scope(),
        };
        // Dependencies of a shared instance resolve from its owning scope.
        context.change_scope(owner.clone());

        let instance = owner.get_or_create_shared(registration.id(), || {
            next.run(context)?;
            context.instance().cloned().ok_or_else(|| {
                Error::activation(&*registration, "pipeline completed without an instance")
            })
        })?;
        context.set_instance(instance);
        Ok(())
    }
}

/// Invokes the registration's activator with the request parameters
pub struct ActivatorMiddleware {
    activator: Arc<dyn Activator>,
}

impl ActivatorMiddleware {
    /// Middleware running `activator`
    pub fn new(activator: Arc<dyn Activator>) -> Self {
        Self { activator }
    }
}

impl fmt::Display for ActivatorMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActivatorMiddleware({})", self.activator.limit_type())
    }
}

impl ResolveMiddleware for ActivatorMiddleware {
    fn phase(&self) -> PipelinePhase {
        PipelinePhase::Activation
    }

    fn execute(&self, context: &mut ResolveRequestContext<'_>, next: Next<'_>) -> Result<()> {
        let parameters = context.parameters().to_vec();
        let instance = self.activator.activate(context, &parameters)?;
        context.set_instance(instance);
        context.mark_new_instance_activated();
        next.run(context)
    }
}

type MiddlewareDelegate =
    Arc<dyn Fn(&mut ResolveRequestContext<'_>, Next<'_>) -> Result<()> + Send + Sync>;

/// Middleware backed by a closure
#[derive(Clone)]
pub struct DelegateMiddleware {
    name: String,
    phase: PipelinePhase,
    callback: MiddlewareDelegate,
}

impl DelegateMiddleware {
    /// Named middleware in `phase` running `callback`
    pub fn new<F>(name: impl Into<String>, phase: PipelinePhase, callback: F) -> Self
    where
        F: Fn(&mut ResolveRequestContext<'_>, Next<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            phase,
            callback: Arc::new(callback),
        }
    }
}

impl fmt::Display for DelegateMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl ResolveMiddleware for DelegateMiddleware {
    fn phase(&self) -> PipelinePhase {
        self.phase
    }

    fn execute(&self, context: &mut ResolveRequestContext<'_>, next: Next<'_>) -> Result<()> {
        (self.callback)(context, next)
    }
}
