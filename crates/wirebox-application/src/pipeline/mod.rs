//! Resolve pipeline
//!
//! Every registration is activated through an ordered list of middleware,
//! grouped into fixed phases. Execution is onion-style: each middleware gets
//! a [`Next`] continuation and may work before it, after it, or skip it
//! entirely (for example to return a cached instance).
//!
//! ```text
//! ResolveRequestStart → ScopeSelection → Decoration → Sharing
//!   → ServicePipelineEnd → RegistrationPipelineStart
//!   → ParameterSelection → Activation
//! ```

mod builder;
mod middleware;

use std::fmt;
use std::sync::Arc;

use wirebox_domain::Result;

use crate::resolving::ResolveRequestContext;

pub use builder::{ResolvePipeline, ResolvePipelineBuilder};
pub use middleware::{ActivatorMiddleware, DelegateMiddleware, SharingMiddleware};

/// Fixed pipeline phases, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PipelinePhase {
    /// Start of the request
    ResolveRequestStart,
    /// Selection of the lifetime scope that owns the instance
    ScopeSelection,
    /// Decoration of the produced instance
    Decoration,
    /// Shared instance lookup
    Sharing,
    /// End of the service-level portion of the pipeline
    ServicePipelineEnd,
    /// Start of the registration-level portion of the pipeline
    RegistrationPipelineStart,
    /// Adjustment of the parameters passed to the activator
    ParameterSelection,
    /// Instance activation
    Activation,
}

impl fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a middleware is placed among others of the same phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MiddlewareInsertionMode {
    /// Before everything already in the phase
    StartOfPhase,
    /// After everything already in the phase
    #[default]
    EndOfPhase,
}

/// One stage of a resolve pipeline
pub trait ResolveMiddleware: Send + Sync + fmt::Display {
    /// The phase this middleware belongs to
    fn phase(&self) -> PipelinePhase;

    /// Run the stage; call `next.run(context)` to continue the pipeline
    fn execute(&self, context: &mut ResolveRequestContext<'_>, next: Next<'_>) -> Result<()>;
}

/// Continuation over the remaining middleware of a pipeline
pub struct Next<'p> {
    remaining: &'p [Arc<dyn ResolveMiddleware>],
}

impl<'p> Next<'p> {
    pub(crate) fn new(remaining: &'p [Arc<dyn ResolveMiddleware>]) -> Self {
        Self { remaining }
    }

    /// Number of stages still to run
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Run the rest of the pipeline
    pub fn run(self, context: &mut ResolveRequestContext<'_>) -> Result<()> {
        let Some((current, rest)) = self.remaining.split_first() else {
            return Ok(());
        };

        context.set_phase_reached(current.phase());
        let tracer = context.tracer();
        if let Some(tracer) = &tracer {
            tracer.middleware_start(context, current.as_ref());
        }

        let result = current.execute(context, Next::new(rest));

        if let Some(tracer) = &tracer {
            match &result {
                Ok(()) => tracer.middleware_success(context, current.as_ref()),
                Err(error) => tracer.middleware_failure(context, current.as_ref(), error),
            }
        }
        result
    }
}
