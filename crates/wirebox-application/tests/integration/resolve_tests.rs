//! Resolve operation tests: dependencies, cycles, depth limit and errors

use std::sync::Arc;

use wirebox_application::{
    ComponentRegistration, ComponentRegistryServices, ConstructorActivator, LifetimeScope,
    OperationState, Parameter, ResolveOperation, ResolveRequest, ScopeOptions, ServicesTracker,
};
use wirebox_domain::{Error, Service, TypeDescriptor};

use crate::common::{
    as_text, constructed_registration, root_scope, text, text_registration, wrapping_factory,
};

fn typed(name: &str) -> Service {
    Service::typed(TypeDescriptor::named(name))
}

fn register(tracker: &ServicesTracker, registration: ComponentRegistration) {
    tracker
        .add_registration(Arc::new(registration), false, false)
        .unwrap();
}

// ============================================================================
// Dependencies
// ============================================================================

#[cfg(test)]
mod dependency_tests {
    use super::*;

    #[test]
    fn test_resolves_constructor_dependencies() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, text_registration("Db", "Db", [typed("Db")]));
        register(&tracker, text_registration("Cache", "Cache", [typed("Cache")]));
        register(&tracker, constructed_registration("Repo", &["Db", "Cache"]));
        register(&tracker, constructed_registration("Service", &["Repo"]));

        let instance = root_scope(&tracker).resolve_service(&typed("Service")).unwrap();
        assert_eq!(as_text(&instance), "Service(Repo(Db, Cache))");
    }

    #[test]
    fn test_missing_dependency_reports_component() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, constructed_registration("Repo", &["Db"]));

        let err = root_scope(&tracker)
            .resolve_service(&typed("Repo"))
            .unwrap_err();
        match err {
            Error::DependencyResolution {
                implementation,
                dependency,
            } => {
                assert_eq!(implementation, "Repo");
                assert_eq!(dependency, "Db");
            }
            other => panic!("Expected DependencyResolution, got {other:?}"),
        }
    }

    #[test]
    fn test_unregistered_service() {
        let tracker = Arc::new(ServicesTracker::new());
        let err = root_scope(&tracker)
            .resolve_service(&typed("Nothing"))
            .unwrap_err();
        assert!(matches!(err, Error::NotRegistered { .. }));
        assert!(!root_scope(&tracker).is_registered(&typed("Nothing")).unwrap());
    }

    #[test]
    fn test_parameters_override_resolution() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, text_registration("Db", "Db", [typed("Db")]));
        let activator = ConstructorActivator::new(
            TypeDescriptor::named("Repo"),
            [TypeDescriptor::named("Db"), TypeDescriptor::named("Name")],
            wrapping_factory("Repo"),
        )
        .with_parameters(vec![Parameter::typed(
            TypeDescriptor::named("Name"),
            text("configured"),
        )]);
        register(
            &tracker,
            ComponentRegistration::new(Arc::new(activator), [typed("Repo")]),
        );

        let scope = root_scope(&tracker);
        let instance = scope.resolve_service(&typed("Repo")).unwrap();
        assert_eq!(as_text(&instance), "Repo(Db, configured)");

        let registration = tracker
            .try_get_service_registration(&typed("Repo"))
            .unwrap()
            .registration;
        let request = ResolveRequest::new(typed("Repo"), registration)
            .with_parameters(vec![Parameter::positional(0, text("InMemoryDb"))]);
        let instance = scope.resolve_request(request).unwrap();
        assert_eq!(as_text(&instance), "Repo(InMemoryDb, configured)");
    }

    #[test]
    fn test_resolve_all_returns_default_first() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, text_registration("A", "a", [typed("Plugin")]));
        register(&tracker, text_registration("B", "b", [typed("Plugin")]));

        let all = root_scope(&tracker).resolve_all(&typed("Plugin")).unwrap();
        let texts: Vec<_> = all.iter().map(as_text).collect();
        assert_eq!(texts, vec!["b", "a"]);
    }

    #[test]
    fn test_typed_resolve_downcasts() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, text_registration("Greeting", "hello", [typed("Greeting")]));
        let scope = root_scope(&tracker);

        let greeting: Arc<String> = scope.resolve(&typed("Greeting")).unwrap();
        assert_eq!(greeting.as_str(), "hello");

        let err = scope.resolve::<u64>(&typed("Greeting")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }
}

// ============================================================================
// Circular Dependencies
// ============================================================================

#[cfg(test)]
mod cycle_tests {
    use super::*;

    #[test]
    fn test_two_component_cycle() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, constructed_registration("A", &["B"]));
        register(&tracker, constructed_registration("B", &["A"]));

        let err = root_scope(&tracker).resolve_service(&typed("A")).unwrap_err();
        match &err {
            Error::CircularDependency { path } => assert_eq!(path, &["A", "B", "A"]),
            other => panic!("Expected CircularDependency, got {other:?}"),
        }
        assert!(err.is_circular_dependency());
        assert_eq!(err.to_string(), "Circular component dependency detected: A -> B -> A");
    }

    #[test]
    fn test_self_dependency() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, constructed_registration("Loop", &["Loop"]));

        let err = root_scope(&tracker)
            .resolve_service(&typed("Loop"))
            .unwrap_err();
        match err {
            Error::CircularDependency { path } => assert_eq!(path, vec!["Loop", "Loop"]),
            other => panic!("Expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_path_starts_at_repeated_component() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, constructed_registration("Root", &["A"]));
        register(&tracker, constructed_registration("A", &["B"]));
        register(&tracker, constructed_registration("B", &["C"]));
        register(&tracker, constructed_registration("C", &["A"]));

        let err = root_scope(&tracker)
            .resolve_service(&typed("Root"))
            .unwrap_err();
        match err {
            Error::CircularDependency { path } => assert_eq!(path, vec!["A", "B", "C", "A"]),
            other => panic!("Expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, text_registration("Shared", "S", [typed("Shared")]));
        register(&tracker, constructed_registration("Left", &["Shared"]));
        register(&tracker, constructed_registration("Right", &["Shared"]));
        register(&tracker, constructed_registration("Top", &["Left", "Right"]));

        let instance = root_scope(&tracker).resolve_service(&typed("Top")).unwrap();
        assert_eq!(as_text(&instance), "Top(Left(S), Right(S))");
    }

    #[test]
    fn test_max_depth_exceeded() {
        let tracker = Arc::new(ServicesTracker::new());
        register(&tracker, constructed_registration("L0", &["L1"]));
        register(&tracker, constructed_registration("L1", &["L2"]));
        register(&tracker, constructed_registration("L2", &["L3"]));
        register(&tracker, constructed_registration("L3", &["L4"]));
        register(&tracker, text_registration("L4", "end", [typed("L4")]));

        let shallow = LifetimeScope::root_with(
            tracker.clone(),
            ScopeOptions {
                max_resolve_depth: 3,
                ..Default::default()
            },
        );
        match shallow.resolve_service(&typed("L0")).unwrap_err() {
            Error::MaxDepthExceeded { depth, service } => {
                assert_eq!(depth, 3);
                assert_eq!(service, "L3");
            }
            other => panic!("Expected MaxDepthExceeded, got {other:?}"),
        }

        let instance = root_scope(&tracker).resolve_service(&typed("L0")).unwrap();
        assert_eq!(as_text(&instance), "L0(L1(L2(L3(end))))");
    }
}

// ============================================================================
// Operation Lifecycle
// ============================================================================

#[cfg(test)]
mod operation_tests {
    use super::*;

    #[test]
    fn test_operation_runs_once() {
        let tracker = Arc::new(ServicesTracker::new());
        let registration = Arc::new(text_registration("Clock", "tick", [typed("Clock")]));
        tracker
            .add_registration(registration.clone(), false, false)
            .unwrap();

        let mut operation = ResolveOperation::new(root_scope(&tracker));
        assert_eq!(operation.state(), OperationState::Idle);
        assert!(operation.info().initiating_service.is_none());

        let request = ResolveRequest::new(typed("Clock"), registration);
        let instance = operation.execute(request.clone()).unwrap();
        assert_eq!(as_text(&instance), "tick");
        assert_eq!(operation.state(), OperationState::Completed);
        assert_eq!(operation.info().initiating_service, Some(typed("Clock")));
        assert_eq!(operation.depth(), 0);

        let err = operation.execute(request).unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { .. }));
        assert_eq!(operation.state(), OperationState::Completed);
    }

    #[test]
    fn test_failed_operation_state() {
        let tracker = Arc::new(ServicesTracker::new());
        let registration = Arc::new(constructed_registration("Repo", &["Db"]));
        tracker
            .add_registration(registration.clone(), false, false)
            .unwrap();

        let mut operation = ResolveOperation::new(root_scope(&tracker));
        assert!(
            operation
                .execute(ResolveRequest::new(typed("Repo"), registration))
                .is_err()
        );
        assert_eq!(operation.state(), OperationState::Failed);
        assert_eq!(operation.depth(), 0);
    }
}
