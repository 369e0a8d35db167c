use std::fmt;
use std::sync::Arc;

use wirebox_domain::Result;

use super::{MiddlewareInsertionMode, Next, ResolveMiddleware};
use crate::resolving::ResolveRequestContext;

/// Accumulates middleware in phase order
///
/// Cloning the builder copies the middleware list; the middleware instances
/// themselves are shared. Each stage remembers the mode it was inserted
/// with, so one builder can be replayed into another.
#[derive(Clone, Default)]
pub struct ResolvePipelineBuilder {
    stages: Vec<Arc<dyn ResolveMiddleware>>,
    modes: Vec<MiddlewareInsertionMode>,
}

impl ResolvePipelineBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `middleware` at its phase, honouring `mode` within the phase
    pub fn use_middleware(
        &mut self,
        middleware: Arc<dyn ResolveMiddleware>,
        mode: MiddlewareInsertionMode,
    ) -> &mut Self {
        let phase = middleware.phase();
        let position = match mode {
            MiddlewareInsertionMode::StartOfPhase => {
                self.stages.iter().position(|s| s.phase() >= phase)
            }
            MiddlewareInsertionMode::EndOfPhase => {
                self.stages.iter().position(|s| s.phase() > phase)
            }
        }
        .unwrap_or(self.stages.len());
        self.stages.insert(position, middleware);
        self.modes.insert(position, mode);
        self
    }

    /// Insert several middleware, in order, with the same mode
    pub fn use_middleware_list<I>(&mut self, middleware: I, mode: MiddlewareInsertionMode) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn ResolveMiddleware>>,
    {
        for stage in middleware {
            self.use_middleware(stage, mode);
        }
        self
    }

    /// Insert every stage of `other` with the mode it was added with
    ///
    /// Within a phase the result runs `other`'s start-of-phase stages, then
    /// this builder's stages, then `other`'s end-of-phase stages. The
    /// relative order of `other`'s stages is unchanged.
    pub fn use_builder(&mut self, other: &ResolvePipelineBuilder) -> &mut Self {
        let stages = || other.stages.iter().zip(other.modes.iter().copied());
        for (stage, _) in stages()
            .rev()
            .filter(|(_, mode)| *mode == MiddlewareInsertionMode::StartOfPhase)
        {
            self.use_middleware(stage.clone(), MiddlewareInsertionMode::StartOfPhase);
        }
        for (stage, _) in stages().filter(|(_, mode)| *mode == MiddlewareInsertionMode::EndOfPhase)
        {
            self.use_middleware(stage.clone(), MiddlewareInsertionMode::EndOfPhase);
        }
        self
    }

    /// Middleware in execution order
    pub fn middleware(&self) -> &[Arc<dyn ResolveMiddleware>] {
        &self.stages
    }

    /// Insertion mode of each stage, parallel to [`Self::middleware`]
    pub fn insertion_modes(&self) -> &[MiddlewareInsertionMode] {
        &self.modes
    }

    /// True when no middleware has been added
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Freeze the current middleware list into a pipeline
    pub fn build(&self) -> ResolvePipeline {
        ResolvePipeline {
            stages: self.stages.clone().into(),
        }
    }
}

impl fmt::Debug for ResolvePipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.to_string()))
            .finish()
    }
}

/// Immutable, reusable middleware chain
#[derive(Clone)]
pub struct ResolvePipeline {
    stages: Arc<[Arc<dyn ResolveMiddleware>]>,
}

impl ResolvePipeline {
    /// Middleware in execution order
    pub fn middleware(&self) -> &[Arc<dyn ResolveMiddleware>] {
        &self.stages
    }

    /// Run the pipeline against a request context
    pub fn invoke(&self, context: &mut ResolveRequestContext<'_>) -> Result<()> {
        Next::new(&self.stages).run(context)
    }
}

impl fmt::Debug for ResolvePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.to_string()))
            .finish()
    }
}
