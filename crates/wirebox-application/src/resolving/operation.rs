use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};
use uuid::Uuid;
use wirebox_domain::{Error, RegistrationId, Result, Service};

use super::context::ResolveRequestContext;
use super::request::ResolveRequest;
use super::scope::LifetimeScope;
use crate::activators::Instance;
use crate::diagnostics::DiagnosticTracer;

/// Lifecycle of a [`ResolveOperation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    /// Created, not yet executed
    Idle,
    /// Executing
    Active,
    /// Finished with an instance
    Completed,
    /// Finished with an error
    Failed,
}

/// Identity of an operation, handed to tracers and trace subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    /// Unique operation id
    pub id: Uuid,
    /// The top-level service, once the operation has started
    pub initiating_service: Option<Service>,
}

#[derive(Debug)]
struct RequestFrame {
    service: Service,
    registration: RegistrationId,
}

/// One top-level resolve and every nested request it triggers
///
/// The operation owns the stack of in-flight requests. Before a
/// registration's pipeline runs, the stack is checked for that same
/// registration; a hit means the component depends on itself.
pub struct ResolveOperation {
    info: OperationInfo,
    scope: LifetimeScope,
    state: OperationState,
    stack: Vec<RequestFrame>,
    max_depth: usize,
    tracer: Option<Arc<dyn DiagnosticTracer>>,
}

impl ResolveOperation {
    /// New idle operation resolving from `scope`, using the scope's tracer
    /// and depth limit
    pub fn new(scope: LifetimeScope) -> Self {
        let tracer = scope.tracer();
        let max_depth = scope.max_resolve_depth();
        Self {
            info: OperationInfo {
                id: Uuid::new_v4(),
                initiating_service: None,
            },
            scope,
            state: OperationState::Idle,
            stack: Vec::new(),
            max_depth,
            tracer,
        }
    }

    /// Identity of this operation
    pub fn info(&self) -> &OperationInfo {
        &self.info
    }

    /// Current state
    pub fn state(&self) -> OperationState {
        self.state
    }

    /// Number of requests currently in flight
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Attached tracer, if any
    pub fn tracer(&self) -> Option<&Arc<dyn DiagnosticTracer>> {
        self.tracer.as_ref()
    }

    /// Run the operation for its top-level request
    ///
    /// An operation runs once; the attached tracer receives exactly one
    /// success or failure notification.
    pub fn execute(&mut self, request: ResolveRequest) -> Result<Instance> {
        if self.state != OperationState::Idle {
            return Err(Error::invalid_operation(format!(
                "Resolve operation {} has already been executed",
                self.info.id
            )));
        }
        self.state = OperationState::Active;
        self.info.initiating_service = Some(request.service().clone());

        if let Some(tracer) = &self.tracer {
            tracer.operation_start(&self.info, &request);
        }

        let scope = self.scope.clone();
        let result = self.get_or_create_instance(scope, request);

        match &result {
            Ok(instance) => {
                self.state = OperationState::Completed;
                if let Some(tracer) = &self.tracer {
                    tracer.operation_success(&self.info, instance);
                }
            }
            Err(error) => {
                self.state = OperationState::Failed;
                debug!(operation = %self.info.id, error = %error, "Resolve operation failed");
                if let Some(tracer) = &self.tracer {
                    tracer.operation_failure(&self.info, error);
                }
            }
        }
        result
    }

    fn check_request(&self, request: &ResolveRequest) -> Result<()> {
        let registration = request.registration().id();
        if let Some(start) = self
            .stack
            .iter()
            .position(|frame| frame.registration == registration)
        {
            let path = self.stack[start..]
                .iter()
                .map(|frame| frame.service.to_string())
                .chain(std::iter::once(request.service().to_string()));
            return Err(Error::circular_dependency(path));
        }
        if self.stack.len() >= self.max_depth {
            return Err(Error::max_depth_exceeded(self.max_depth, request.service()));
        }
        Ok(())
    }

    pub(crate) fn get_or_create_instance(
        &mut self,
        scope: LifetimeScope,
        request: ResolveRequest,
    ) -> Result<Instance> {
        self.check_request(&request)?;
        trace!(
            operation = %self.info.id,
            service = %request.service(),
            depth = self.stack.len(),
            "Resolve request"
        );

        self.stack.push(RequestFrame {
            service: request.service().clone(),
            registration: request.registration().id(),
        });
        let tracer = self.tracer.clone();
        let pipeline = request
            .registration()
            .resolve_pipeline(request.service(), scope.registry().as_ref());

        let result = {
            let mut context = ResolveRequestContext::new(self, scope, request);
            if let Some(tracer) = &tracer {
                tracer.request_start(&context);
            }

            let result = pipeline.invoke(&mut context).and_then(|()| {
                context.take_instance().ok_or_else(|| {
                    Error::activation(
                        &**context.registration(),
                        "pipeline completed without producing an instance",
                    )
                })
            });

            if let Some(tracer) = &tracer {
                match &result {
                    Ok(instance) => tracer.request_success(&context, instance),
                    Err(error) => tracer.request_failure(&context, error),
                }
            }
            result
        };

        self.stack.pop();
        result
    }
}

impl fmt::Debug for ResolveOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveOperation")
            .field("info", &self.info)
            .field("state", &self.state)
            .field("stack", &self.stack)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
