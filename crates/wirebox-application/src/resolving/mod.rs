//! Resolution
//!
//! A top-level resolve creates one [`ResolveOperation`]. Every nested
//! resolve made while activating dependencies runs on the same operation,
//! which keeps the stack of in-flight requests used for cycle detection.

mod context;
mod operation;
mod request;
mod scope;

pub use context::ResolveRequestContext;
pub use operation::{OperationInfo, OperationState, ResolveOperation};
pub use request::ResolveRequest;
pub use scope::{LifetimeScope, ScopeOptions};
