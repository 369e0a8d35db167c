//! Resolve diagnostics
//!
//! A [`DiagnosticTracer`] attached to a lifetime scope observes every
//! operation started from it: operation start and end, each request, and
//! each middleware stage. [`OperationTracer`] turns those callbacks into a
//! per-operation trace and publishes it when the operation finishes.

mod event_log;

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;
use wirebox_domain::{Error, Service};

use crate::activators::Instance;
use crate::observers::{ObserverList, SubscriptionId};
use crate::pipeline::{PipelinePhase, ResolveMiddleware};
use crate::resolving::{OperationInfo, ResolveRequest, ResolveRequestContext};

pub use event_log::EventLogTraceBuilder;

/// Callbacks raised while resolving; every hook defaults to doing nothing
pub trait DiagnosticTracer: Send + Sync {
    /// A top-level operation is starting
    fn operation_start(&self, _operation: &OperationInfo, _request: &ResolveRequest) {}

    /// A request (top-level or nested) is entering its pipeline
    fn request_start(&self, _context: &ResolveRequestContext<'_>) {}

    /// A middleware stage is about to run
    fn middleware_start(
        &self,
        _context: &ResolveRequestContext<'_>,
        _middleware: &dyn ResolveMiddleware,
    ) {
    }

    /// A middleware stage returned successfully
    fn middleware_success(
        &self,
        _context: &ResolveRequestContext<'_>,
        _middleware: &dyn ResolveMiddleware,
    ) {
    }

    /// A middleware stage returned an error
    fn middleware_failure(
        &self,
        _context: &ResolveRequestContext<'_>,
        _middleware: &dyn ResolveMiddleware,
        _error: &Error,
    ) {
    }

    /// A request produced an instance
    fn request_success(&self, _context: &ResolveRequestContext<'_>, _instance: &Instance) {}

    /// A request failed
    fn request_failure(&self, _context: &ResolveRequestContext<'_>, _error: &Error) {}

    /// The operation completed
    fn operation_success(&self, _operation: &OperationInfo, _instance: &Instance) {}

    /// The operation failed
    fn operation_failure(&self, _operation: &OperationInfo, _error: &Error) {}
}

/// One diagnostic event, as fed to a [`TraceBuilder`]
#[derive(Debug, Clone, Copy)]
pub enum TraceEvent<'a> {
    /// Operation started for the top-level service
    OperationStart {
        /// Top-level service
        service: &'a Service,
    },
    /// Request entered its pipeline
    RequestStart {
        /// Requested service
        service: &'a Service,
        /// Registration being activated
        registration: &'a str,
    },
    /// Middleware stage started
    MiddlewareStart {
        /// Middleware name
        middleware: &'a str,
        /// Middleware phase
        phase: PipelinePhase,
    },
    /// Middleware stage succeeded
    MiddlewareSuccess {
        /// Middleware name
        middleware: &'a str,
    },
    /// Middleware stage failed
    MiddlewareFailure {
        /// Middleware name
        middleware: &'a str,
        /// The failure
        error: &'a Error,
    },
    /// Request produced an instance
    RequestSuccess {
        /// Requested service
        service: &'a Service,
        /// Whether a new instance was activated
        activated: bool,
    },
    /// Request failed
    RequestFailure {
        /// Requested service
        service: &'a Service,
        /// The failure
        error: &'a Error,
    },
    /// Operation completed
    OperationSuccess,
    /// Operation failed
    OperationFailure {
        /// The failure
        error: &'a Error,
    },
}

/// Accumulates the trace of one operation
pub trait TraceBuilder: Default + Send {
    /// Finished trace content
    type Content: Send + Sync;

    /// Record one event
    fn record(&mut self, event: TraceEvent<'_>);

    /// Produce the content once the operation has finished
    fn finish(self) -> Self::Content;
}

/// Raised to subscribers when a traced operation finishes
#[derive(Debug, Clone)]
pub struct OperationTraceCompleted<C> {
    /// The operation that finished
    pub operation: OperationInfo,
    /// Accumulated trace content
    pub trace_content: C,
    /// Whether the operation produced an instance
    pub succeeded: bool,
}

/// Tracer that builds one trace per operation with `B`
pub struct OperationTracer<B: TraceBuilder> {
    traces: DashMap<Uuid, Mutex<B>>,
    completed: ObserverList<OperationTraceCompleted<B::Content>>,
}

impl<B: TraceBuilder> OperationTracer<B> {
    /// Create a tracer with no subscribers
    pub fn new() -> Self {
        Self {
            traces: DashMap::new(),
            completed: ObserverList::new(),
        }
    }

    /// Subscribe to completed traces
    pub fn on_operation_completed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&OperationTraceCompleted<B::Content>) + Send + Sync + 'static,
    {
        self.completed.subscribe(handler)
    }

    /// Remove a subscription
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.completed.unsubscribe(id)
    }

    /// Operations currently being traced
    pub fn in_flight(&self) -> usize {
        self.traces.len()
    }

    /// Shared handle, ready to attach to a scope
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn record(&self, operation: &OperationInfo, event: TraceEvent<'_>) {
        if let Some(builder) = self.traces.get(&operation.id) {
            builder.lock().record(event);
        }
    }

    fn complete(&self, operation: &OperationInfo, event: TraceEvent<'_>, succeeded: bool) {
        let Some((_, builder)) = self.traces.remove(&operation.id) else {
            return;
        };
        let mut builder = builder.into_inner();
        builder.record(event);
        self.completed.notify(&OperationTraceCompleted {
            operation: operation.clone(),
            trace_content: builder.finish(),
            succeeded,
        });
    }
}

impl<B: TraceBuilder> Default for OperationTracer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: TraceBuilder> DiagnosticTracer for OperationTracer<B> {
    fn operation_start(&self, operation: &OperationInfo, request: &ResolveRequest) {
        let mut builder = B::default();
        builder.record(TraceEvent::OperationStart {
            service: request.service(),
        });
        self.traces.insert(operation.id, Mutex::new(builder));
    }

    fn request_start(&self, context: &ResolveRequestContext<'_>) {
        let registration = context.registration().to_string();
        self.record(
            context.operation_info(),
            TraceEvent::RequestStart {
                service: context.service(),
                registration: &registration,
            },
        );
    }

    fn middleware_start(&self, context: &ResolveRequestContext<'_>, middleware: &dyn ResolveMiddleware) {
        let name = middleware.to_string();
        self.record(
            context.operation_info(),
            TraceEvent::MiddlewareStart {
                middleware: &name,
                phase: middleware.phase(),
            },
        );
    }

    fn middleware_success(&self, context: &ResolveRequestContext<'_>, middleware: &dyn ResolveMiddleware) {
        let name = middleware.to_string();
        self.record(
            context.operation_info(),
            TraceEvent::MiddlewareSuccess { middleware: &name },
        );
    }

    fn middleware_failure(
        &self,
        context: &ResolveRequestContext<'_>,
        middleware: &dyn ResolveMiddleware,
        error: &Error,
    ) {
        let name = middleware.to_string();
        self.record(
            context.operation_info(),
            TraceEvent::MiddlewareFailure {
                middleware: &name,
                error,
            },
        );
    }

    fn request_success(&self, context: &ResolveRequestContext<'_>, _instance: &Instance) {
        self.record(
            context.operation_info(),
            TraceEvent::RequestSuccess {
                service: context.service(),
                activated: context.new_instance_activated(),
            },
        );
    }

    fn request_failure(&self, context: &ResolveRequestContext<'_>, error: &Error) {
        self.record(
            context.operation_info(),
            TraceEvent::RequestFailure {
                service: context.service(),
                error,
            },
        );
    }

    fn operation_success(&self, operation: &OperationInfo, _instance: &Instance) {
        self.complete(operation, TraceEvent::OperationSuccess, true);
    }

    fn operation_failure(&self, operation: &OperationInfo, error: &Error) {
        self.complete(operation, TraceEvent::OperationFailure { error }, false);
    }
}
