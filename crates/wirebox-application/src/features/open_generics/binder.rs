use wirebox_domain::{Error, GenericBindings, Result, Service, TypeDescriptor};

/// An open-generic implementation closed over a requested service
#[derive(Debug, Clone)]
pub struct BoundService {
    /// The closed implementation type
    pub implementation: TypeDescriptor,
    /// Every declared service closed with the same bindings
    pub services: Vec<Service>,
    /// Parameter assignments inferred from the requested service
    pub bindings: GenericBindings,
}

/// Closes open-generic implementations over requested services
pub struct OpenGenericServiceBinder;

impl OpenGenericServiceBinder {
    /// Bind `implementation` to the closed `requested` service
    ///
    /// `requested` is matched against each declared open service of the same
    /// variant and key. The first declared service whose type unifies with
    /// the requested type supplies the bindings; the implementation must be
    /// fully closed by them. Declared services that the bindings do not close
    /// are left out of the result.
    pub fn try_bind(
        requested: &Service,
        declared: &[Service],
        implementation: &TypeDescriptor,
    ) -> Option<BoundService> {
        if requested.is_open() {
            return None;
        }

        declared
            .iter()
            .filter(|d| d.is_open() && d.same_identity_kind(requested))
            .find_map(|d| d.service_type().bind(requested.service_type()))
            .and_then(|bindings| {
                let implementation = implementation.substitute(&bindings).ok()?;
                let services = declared
                    .iter()
                    .filter_map(|d| {
                        d.service_type()
                            .substitute(&bindings)
                            .ok()
                            .map(|closed| d.change_type(closed))
                    })
                    .collect();
                Some(BoundService {
                    implementation,
                    services,
                    bindings,
                })
            })
    }

    /// Check that `implementation` can be closed from each of `services`
    pub fn enforce_bindable(implementation: &TypeDescriptor, services: &[Service]) -> Result<()> {
        if !implementation.is_open() {
            return Err(Error::configuration(format!(
                "Implementation type '{implementation}' is not an open generic type"
            )));
        }
        for service in services {
            if !service.is_open() {
                return Err(Error::configuration(format!(
                    "Service '{service}' is not an open generic type; \
                     '{implementation}' cannot be registered as an open generic for it"
                )));
            }
            if !implementation.is_bindable_to(service.service_type()) {
                return Err(Error::configuration(format!(
                    "The generic parameters of '{implementation}' cannot all be inferred from '{service}'"
                )));
            }
        }
        Ok(())
    }
}
