//! Context for foreign errors
//!
//! Serializer, filesystem and subscriber errors surface as
//! [`wirebox_domain::Error`] values whose message starts with what wirebox
//! was doing at the time.

use std::fmt;

use wirebox_domain::error::BoxError;
use wirebox_domain::{Error, Result};

/// Attach a description of the failed step to a foreign error
///
/// # Example
///
/// ```ignore
/// use wirebox_infrastructure::error_ext::ErrorContext;
///
/// // config::loader, saving a configuration
/// let toml_string =
///     toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
/// std::fs::write(path, toml_string)
///     .io_context(format!("Failed to write config file {}", path.display()))?;
///
/// // logging, file appender
/// builder
///     .build(&directory)
///     .with_context(|| format!("Failed to open log file in {}", directory.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Map the error to [`Error::Infrastructure`]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display;

    /// Like [`ErrorContext::context`], building the message only on failure
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;

    /// Map the error to [`Error::Io`]
    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display;

    /// Map the error to [`Error::Configuration`]
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display;
}

fn attach<T, E, C>(
    result: std::result::Result<T, E>,
    context: C,
    kind: fn(String, Option<BoxError>) -> Error,
) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
    C: fmt::Display,
{
    result.map_err(|err| kind(format!("{context}: {err}"), Some(Box::new(err))))
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display,
    {
        attach(self, context, |message, source| Error::Infrastructure { message, source })
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        match self {
            Ok(value) => Ok(value),
            Err(err) => Err::<T, E>(err).context(f()),
        }
    }

    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display,
    {
        attach(self, context, |message, source| Error::Io { message, source })
    }

    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display,
    {
        attach(self, context, |message, source| Error::Configuration { message, source })
    }
}
