//! End-to-end resolution through open-generic decorators

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wirebox_application::{
    ComponentRegistryServices, LifetimeScope, OpenGenericDecoratorActivatorData,
    OpenGenericDecoratorRegistrationSource, Parameter, RegistrationData, ResolvePipelineBuilder,
    ServicesTracker,
};
use wirebox_domain::{Error, RegistrationOrigin, Service, SharingMode, TypeDescriptor};

use crate::common::{
    as_text, counting_registration, decorator_source, handler_of, int_handler, open_handler,
    root_scope, text, text_registration, wrapping_factory,
};

fn implementor(service_type: TypeDescriptor) -> Service {
    Service::keyed("implementor", service_type)
}

/// Tracker with `Basic` registered as the keyed implementor of `IHandler<i32>`
fn tracker_with_basic() -> Arc<ServicesTracker> {
    let tracker = Arc::new(ServicesTracker::new());
    tracker
        .add_registration(
            Arc::new(text_registration("Basic", "Basic", [implementor(int_handler())])),
            false,
            false,
        )
        .unwrap();
    tracker
}

#[test]
fn test_decorator_wraps_implementor() {
    let tracker = tracker_with_basic();
    tracker.add_registration_source(Arc::new(
        decorator_source(
            "Logging",
            implementor(open_handler()),
            Service::typed(open_handler()),
        )
        .unwrap(),
    ));

    let instance = root_scope(&tracker)
        .resolve_service(&Service::typed(int_handler()))
        .unwrap();
    assert_eq!(as_text(&instance), "Logging(Basic)");

    let registration = tracker
        .try_get_service_registration(&Service::typed(int_handler()))
        .unwrap()
        .registration;
    assert_eq!(registration.origin(), RegistrationOrigin::DynamicSource);
    assert_eq!(registration.limit_type().to_string(), "Logging<i32>");
}

#[test]
fn test_decorator_source_added_after_negative_lookup() {
    let tracker = tracker_with_basic();
    let scope = root_scope(&tracker);
    assert!(!scope.is_registered(&Service::typed(int_handler())).unwrap());

    tracker.add_registration_source(Arc::new(
        decorator_source(
            "Logging",
            implementor(open_handler()),
            Service::typed(open_handler()),
        )
        .unwrap(),
    ));

    let instance = scope.resolve_service(&Service::typed(int_handler())).unwrap();
    assert_eq!(as_text(&instance), "Logging(Basic)");
}

#[test]
fn test_implementor_registered_after_resolve_is_decorated() {
    let tracker = tracker_with_basic();
    let d1 = Service::keyed("d1", open_handler());
    tracker.add_registration_source(Arc::new(
        decorator_source("D1", implementor(open_handler()), d1.clone()).unwrap(),
    ));
    tracker.add_registration_source(Arc::new(
        decorator_source("D2", d1, Service::typed(open_handler())).unwrap(),
    ));
    let scope = root_scope(&tracker);
    let first = scope.resolve_service(&Service::typed(int_handler())).unwrap();
    assert_eq!(as_text(&first), "D2(D1(Basic))");

    tracker
        .add_registration(
            Arc::new(text_registration("Fast", "Fast", [implementor(int_handler())])),
            false,
            false,
        )
        .unwrap();

    let all = scope.resolve_all(&Service::typed(int_handler())).unwrap();
    let texts: Vec<_> = all.iter().map(as_text).collect();
    assert_eq!(texts, vec!["D2(D1(Basic))", "D2(D1(Fast))"]);

    let default = scope.resolve_service(&Service::typed(int_handler())).unwrap();
    assert_eq!(as_text(&default), "D2(D1(Basic))");
}

#[test]
fn test_decorator_chain_in_registration_order() {
    let tracker = tracker_with_basic();
    let d1 = Service::keyed("d1", open_handler());
    tracker.add_registration_source(Arc::new(
        decorator_source("D1", implementor(open_handler()), d1.clone()).unwrap(),
    ));
    tracker.add_registration_source(Arc::new(
        decorator_source("D2", d1, Service::typed(open_handler())).unwrap(),
    ));

    let instance = root_scope(&tracker)
        .resolve_service(&Service::typed(int_handler()))
        .unwrap();
    assert_eq!(as_text(&instance), "D2(D1(Basic))");
}

#[test]
fn test_each_implementor_decorated_individually() {
    let tracker = tracker_with_basic();
    tracker
        .add_registration(
            Arc::new(text_registration("Fast", "Fast", [implementor(int_handler())])),
            false,
            false,
        )
        .unwrap();
    tracker.add_registration_source(Arc::new(
        decorator_source(
            "Logging",
            implementor(open_handler()),
            Service::typed(open_handler()),
        )
        .unwrap(),
    ));

    let all = root_scope(&tracker)
        .resolve_all(&Service::typed(int_handler()))
        .unwrap();
    let texts: Vec<_> = all.iter().map(as_text).collect();
    assert_eq!(texts, vec!["Logging(Fast)", "Logging(Basic)"]);
}

#[test]
fn test_decorator_closes_over_each_argument() {
    let tracker = tracker_with_basic();
    let text_handler = handler_of(TypeDescriptor::named("String"));
    tracker
        .add_registration(
            Arc::new(text_registration("Echo", "Echo", [implementor(text_handler.clone())])),
            false,
            false,
        )
        .unwrap();
    tracker.add_registration_source(Arc::new(
        decorator_source(
            "Logging",
            implementor(open_handler()),
            Service::typed(open_handler()),
        )
        .unwrap(),
    ));

    let scope = root_scope(&tracker);
    let ints = scope.resolve_service(&Service::typed(int_handler())).unwrap();
    let strings = scope.resolve_service(&Service::typed(text_handler)).unwrap();
    assert_eq!(as_text(&ints), "Logging(Basic)");
    assert_eq!(as_text(&strings), "Logging(Echo)");

    let closed: Vec<_> = tracker
        .registrations()
        .iter()
        .filter(|r| r.origin() == RegistrationOrigin::DynamicSource)
        .map(|r| r.limit_type().to_string())
        .collect();
    assert_eq!(closed, vec!["Logging<i32>", "Logging<String>"]);
}

#[test]
fn test_no_implementor_means_not_registered() {
    let tracker = Arc::new(ServicesTracker::new());
    tracker.add_registration_source(Arc::new(
        decorator_source(
            "Logging",
            implementor(open_handler()),
            Service::typed(open_handler()),
        )
        .unwrap(),
    ));

    let err = root_scope(&tracker)
        .resolve_service(&Service::typed(int_handler()))
        .unwrap_err();
    assert!(matches!(err, Error::NotRegistered { .. }));
}

#[test]
fn test_configured_parameters_follow_decorated_component() {
    let tracker = tracker_with_basic();
    let data = OpenGenericDecoratorActivatorData::new(
        TypeDescriptor::generic("Tagged", [TypeDescriptor::param("T")]),
        implementor(open_handler()),
        [open_handler(), TypeDescriptor::named("Tag")],
        wrapping_factory("Tagged"),
    )
    .with_parameters(vec![Parameter::typed(TypeDescriptor::named("Tag"), text("v2"))]);
    tracker.add_registration_source(Arc::new(
        OpenGenericDecoratorRegistrationSource::new(
            RegistrationData::new([Service::typed(open_handler())]),
            ResolvePipelineBuilder::new(),
            data,
        )
        .unwrap(),
    ));

    let instance = root_scope(&tracker)
        .resolve_service(&Service::typed(int_handler()))
        .unwrap();
    assert_eq!(as_text(&instance), "Tagged(Basic, v2)");
}

#[test]
fn test_singleton_decorator_shares_decorated_instance() {
    let tracker = Arc::new(ServicesTracker::new());
    let activations = Arc::new(AtomicUsize::new(0));
    tracker
        .add_registration(
            Arc::new(counting_registration(
                "Basic",
                activations.clone(),
                vec![implementor(int_handler())],
            )),
            false,
            false,
        )
        .unwrap();
    let data = OpenGenericDecoratorActivatorData::new(
        TypeDescriptor::generic("Logging", [TypeDescriptor::param("T")]),
        implementor(open_handler()),
        [open_handler()],
        wrapping_factory("Logging"),
    );
    tracker.add_registration_source(Arc::new(
        OpenGenericDecoratorRegistrationSource::new(
            RegistrationData::new([Service::typed(open_handler())])
                .with_sharing(SharingMode::Singleton),
            ResolvePipelineBuilder::new(),
            data,
        )
        .unwrap(),
    ));

    let root = LifetimeScope::root(tracker.clone());
    let child = root.begin_lifetime_scope();
    let first = root.resolve_service(&Service::typed(int_handler())).unwrap();
    let second = child.resolve_service(&Service::typed(int_handler())).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(as_text(&first), "Logging(Basic#1)");
    assert_eq!(activations.load(Ordering::SeqCst), 1);
}
