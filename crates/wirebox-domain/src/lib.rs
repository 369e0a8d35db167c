//! # Domain Layer
//!
//! Pure value types shared by the resolution core and the infrastructure
//! layer. Nothing here performs resolution; it only describes *what* is
//! wanted and how failures are reported.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`service`] | Typed, keyed and named service identifiers |
//! | [`types`] | Structural type descriptors with open-generic binding |
//! | [`registration`] | Registration identity, sharing mode, origin |
//! | [`error`] | Error taxonomy and `Result` alias |
//! | [`constants`] | Resolution constants |

pub mod constants;
pub mod error;
pub mod registration;
pub mod service;
pub mod types;

pub use error::{Error, Result};
pub use registration::{RegistrationId, RegistrationOrigin, SharingMode};
pub use service::{Service, ServiceKey};
pub use types::{GenericBindings, GenericParameter, TypeDescriptor};
