//! Open-generic support
//!
//! Registrations declared over open type descriptors (`Logging<T>` for
//! `IHandler<T>`) are closed on demand when a concrete service such as
//! `IHandler<i32>` is requested.

mod binder;
mod decorator_source;

pub use binder::{BoundService, OpenGenericServiceBinder};
pub use decorator_source::{OpenGenericDecoratorActivatorData, OpenGenericDecoratorRegistrationSource};
