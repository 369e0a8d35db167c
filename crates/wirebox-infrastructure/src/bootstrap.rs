//! Runtime bootstrap - composition root
//!
//! Builds the shared services tracker and the root lifetime scope from an
//! [`AppConfig`]: the scope gets the configured resolve depth limit and, when
//! diagnostics are enabled, a [`LoggingDiagnosticTracer`].
//!
//! ```text
//! AppConfig → validate → ServicesTracker ──► root LifetimeScope
//!                                  ▲               │ (depth limit, tracer)
//!                       registrations/sources      ▼
//!                                          child scopes per unit of work
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ConfigLoader::new().load()?;
//! let runtime = Runtime::from_config(&config)?;
//! runtime.tracker().add_registration(Arc::new(registration), false, false)?;
//! let instance = runtime.root_scope().resolve_service(&service)?;
//! ```

use std::sync::Arc;

use tracing::info;
use wirebox_application::{DiagnosticTracer, LifetimeScope, ScopeOptions, ServicesTracker};
use wirebox_domain::Result;

use crate::config::loader::validate_app_config;
use crate::config::{AppConfig, ConfigLoader};
use crate::diagnostics::LoggingDiagnosticTracer;

/// Registry and root scope built from configuration
#[derive(Clone)]
pub struct Runtime {
    /// Application configuration
    config: Arc<AppConfig>,
    /// Registry shared by every scope of this runtime
    tracker: Arc<ServicesTracker>,
    /// Scope owning singletons
    root: LifetimeScope,
}

impl Runtime {
    /// Build a runtime from an already loaded configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        validate_app_config(config)?;

        let tracer: Option<Arc<dyn DiagnosticTracer>> = if config.diagnostics.enabled {
            Some(Arc::new(LoggingDiagnosticTracer::from_config(
                &config.diagnostics,
            )?))
        } else {
            None
        };

        let tracker = Arc::new(ServicesTracker::new());
        let root = LifetimeScope::root_with(
            tracker.clone(),
            ScopeOptions {
                tracer,
                max_resolve_depth: config.resolve.max_resolve_depth,
            },
        );

        info!(
            max_resolve_depth = config.resolve.max_resolve_depth,
            diagnostics = config.diagnostics.enabled,
            "Runtime initialized"
        );

        Ok(Self {
            config: Arc::new(config.clone()),
            tracker,
            root,
        })
    }

    /// Load configuration through `loader` and build the runtime
    pub fn load(loader: &ConfigLoader) -> Result<Self> {
        let config = loader.load()?;
        Self::from_config(&config)
    }

    /// Configuration the runtime was built from
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry to add registrations and sources to
    pub fn tracker(&self) -> &Arc<ServicesTracker> {
        &self.tracker
    }

    /// The root scope
    pub fn root_scope(&self) -> &LifetimeScope {
        &self.root
    }

    /// New child of the root scope
    pub fn begin_lifetime_scope(&self) -> LifetimeScope {
        self.root.begin_lifetime_scope()
    }
}
