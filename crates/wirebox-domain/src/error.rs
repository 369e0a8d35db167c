//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error used as the source of wrapped failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for wirebox
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid component or source configuration, raised while a
    /// registration is being constructed
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// An operation was attempted in a state that does not allow it
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of the invalid operation
        message: String,
    },

    /// No registration can satisfy the requested service
    #[error("The requested service '{service}' has not been registered")]
    NotRegistered {
        /// Description of the requested service
        service: String,
    },

    /// A registration was requested again while it was still being activated
    #[error("Circular component dependency detected: {}", path.join(" -> "))]
    CircularDependency {
        /// Services on the cycle, outermost first, ending with the repeated one
        path: Vec<String>,
    },

    /// Nested resolution went deeper than the configured limit
    #[error("Probable circular dependency: resolve depth {depth} exceeded while resolving '{service}'")]
    MaxDepthExceeded {
        /// The configured maximum depth
        depth: usize,
        /// The service being resolved when the limit was hit
        service: String,
    },

    /// A dependency of a component could not be satisfied
    #[error("Cannot resolve dependency '{dependency}' of '{implementation}'")]
    DependencyResolution {
        /// The component type being constructed
        implementation: String,
        /// The dependency type that could not be supplied
        dependency: String,
    },

    /// The activator of a registration failed
    #[error("Activation of '{registration}' failed: {message}")]
    Activation {
        /// Description of the registration that failed
        registration: String,
        /// Description of the failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// A resolved instance could not be downcast to the requested type
    #[error("Instance resolved for '{service}' is not of type '{expected}'")]
    TypeMismatch {
        /// The Rust type requested by the caller
        expected: String,
        /// The service that was resolved
        service: String,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxError>,
    },
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid operation error
    pub fn invalid_operation<S: Into<String>>(message: S) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}

// Resolution error creation methods
impl Error {
    /// Create a not registered error
    pub fn not_registered<S: ToString>(service: S) -> Self {
        Self::NotRegistered {
            service: service.to_string(),
        }
    }

    /// Create a circular dependency error from the services on the cycle
    pub fn circular_dependency<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self::CircularDependency {
            path: path.into_iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create a max depth exceeded error
    pub fn max_depth_exceeded<S: ToString>(depth: usize, service: S) -> Self {
        Self::MaxDepthExceeded {
            depth,
            service: service.to_string(),
        }
    }

    /// Create a dependency resolution error
    pub fn dependency_resolution<I: ToString, D: ToString>(implementation: I, dependency: D) -> Self {
        Self::DependencyResolution {
            implementation: implementation.to_string(),
            dependency: dependency.to_string(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch<S: ToString>(expected: &str, service: S) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            service: service.to_string(),
        }
    }
}

// Activation error creation methods
impl Error {
    /// Create an activation error
    pub fn activation<R: ToString, S: Into<String>>(registration: R, message: S) -> Self {
        Self::Activation {
            registration: registration.to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an activation error with source
    pub fn activation_with_source<R, E>(registration: R, source: E) -> Self
    where
        R: ToString,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Activation {
            registration: registration.to_string(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

// Infrastructure error creation methods
impl Error {
    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an infrastructure error
    pub fn infrastructure<S: Into<String>>(message: S) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }
}

impl Error {
    /// Whether this error was raised by cycle detection
    pub fn is_circular_dependency(&self) -> bool {
        matches!(
            self,
            Self::CircularDependency { .. } | Self::MaxDepthExceeded { .. }
        )
    }
}
