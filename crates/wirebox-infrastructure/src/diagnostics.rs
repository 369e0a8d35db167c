//! Diagnostic tracer backed by `tracing`
//!
//! Reports every resolve operation, request and middleware transition as a
//! tracing event under the `wirebox::resolve` target. Operation and request
//! failures are always emitted at `WARN`; everything else uses the
//! configured level.

use tracing::Level;
use wirebox_application::{
    DiagnosticTracer, Instance, OperationInfo, ResolveMiddleware, ResolveRequest,
    ResolveRequestContext,
};
use wirebox_domain::{Error, Result};

use crate::config::DiagnosticsConfig;
use crate::constants::DIAGNOSTICS_TARGET;
use crate::logging::parse_log_level;

// Event levels must be constants at each callsite.
macro_rules! emit {
    ($level:expr, $($arg:tt)+) => {{
        let level = $level;
        if level == Level::TRACE {
            tracing::trace!(target: DIAGNOSTICS_TARGET, $($arg)+);
        } else if level == Level::DEBUG {
            tracing::debug!(target: DIAGNOSTICS_TARGET, $($arg)+);
        } else if level == Level::INFO {
            tracing::info!(target: DIAGNOSTICS_TARGET, $($arg)+);
        } else if level == Level::WARN {
            tracing::warn!(target: DIAGNOSTICS_TARGET, $($arg)+);
        } else {
            tracing::error!(target: DIAGNOSTICS_TARGET, $($arg)+);
        }
    }};
}

/// Tracer that logs resolve diagnostics
#[derive(Debug, Clone, Copy)]
pub struct LoggingDiagnosticTracer {
    level: Level,
}

impl LoggingDiagnosticTracer {
    /// Tracer emitting at `level`
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Tracer configured from the diagnostics section
    pub fn from_config(config: &DiagnosticsConfig) -> Result<Self> {
        Ok(Self::new(parse_log_level(&config.level)?))
    }

    /// Level used for non-failure events
    pub fn level(&self) -> Level {
        self.level
    }
}

impl Default for LoggingDiagnosticTracer {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl DiagnosticTracer for LoggingDiagnosticTracer {
    fn operation_start(&self, operation: &OperationInfo, request: &ResolveRequest) {
        emit!(
            self.level,
            operation = %operation.id,
            service = %request.service(),
            "Resolve operation started"
        );
    }

    fn request_start(&self, context: &ResolveRequestContext<'_>) {
        emit!(
            self.level,
            operation = %context.operation_info().id,
            service = %context.service(),
            registration = %context.registration(),
            "Resolve request started"
        );
    }

    fn middleware_start(
        &self,
        context: &ResolveRequestContext<'_>,
        middleware: &dyn ResolveMiddleware,
    ) {
        emit!(
            self.level,
            operation = %context.operation_info().id,
            middleware = %middleware,
            phase = %middleware.phase(),
            "Entering middleware"
        );
    }

    fn middleware_success(
        &self,
        context: &ResolveRequestContext<'_>,
        middleware: &dyn ResolveMiddleware,
    ) {
        emit!(
            self.level,
            operation = %context.operation_info().id,
            middleware = %middleware,
            "Exiting middleware"
        );
    }

    fn middleware_failure(
        &self,
        context: &ResolveRequestContext<'_>,
        middleware: &dyn ResolveMiddleware,
        error: &Error,
    ) {
        emit!(
            self.level,
            operation = %context.operation_info().id,
            middleware = %middleware,
            error = %error,
            "Middleware failed"
        );
    }

    fn request_success(&self, context: &ResolveRequestContext<'_>, _instance: &Instance) {
        emit!(
            self.level,
            operation = %context.operation_info().id,
            service = %context.service(),
            activated = context.new_instance_activated(),
            "Resolve request succeeded"
        );
    }

    fn request_failure(&self, context: &ResolveRequestContext<'_>, error: &Error) {
        tracing::warn!(
            target: DIAGNOSTICS_TARGET,
            operation = %context.operation_info().id,
            service = %context.service(),
            error = %error,
            "Resolve request failed"
        );
    }

    fn operation_success(&self, operation: &OperationInfo, _instance: &Instance) {
        emit!(
            self.level,
            operation = %operation.id,
            "Resolve operation succeeded"
        );
    }

    fn operation_failure(&self, operation: &OperationInfo, error: &Error) {
        tracing::warn!(
            target: DIAGNOSTICS_TARGET,
            operation = %operation.id,
            error = %error,
            "Resolve operation failed"
        );
    }
}
