//! Sharing modes across lifetime scopes

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wirebox_application::{LifetimeScope, ServicesTracker};
use wirebox_domain::{Service, SharingMode, TypeDescriptor};

use crate::common::{as_text, counting_registration};

fn session() -> Service {
    Service::typed(TypeDescriptor::named("Session"))
}

fn setup(sharing: SharingMode) -> (LifetimeScope, Arc<AtomicUsize>) {
    let tracker = Arc::new(ServicesTracker::new());
    let counter = Arc::new(AtomicUsize::new(0));
    tracker
        .add_registration(
            Arc::new(
                counting_registration("Session", counter.clone(), vec![session()])
                    .with_sharing(sharing),
            ),
            false,
            false,
        )
        .unwrap();
    (LifetimeScope::root(tracker), counter)
}

#[test]
fn test_unique_per_request_always_activates() {
    let (root, counter) = setup(SharingMode::UniquePerRequest);

    let a = root.resolve_service(&session()).unwrap();
    let b = root.resolve_service(&session()).unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(root.shared_instance_count(), 0);
}

#[test]
fn test_shared_in_scope_per_scope() {
    let (root, counter) = setup(SharingMode::SharedInScope);
    let left = root.begin_lifetime_scope();
    let right = root.begin_lifetime_scope();

    let l1 = left.resolve_service(&session()).unwrap();
    let l2 = left.resolve_service(&session()).unwrap();
    let r1 = right.resolve_service(&session()).unwrap();

    assert!(Arc::ptr_eq(&l1, &l2));
    assert!(!Arc::ptr_eq(&l1, &r1));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(left.shared_instance_count(), 1);
    assert_eq!(root.shared_instance_count(), 0);
}

#[test]
fn test_singleton_owned_by_root() {
    let (root, counter) = setup(SharingMode::Singleton);
    let child = root.begin_lifetime_scope();
    let grandchild = child.begin_lifetime_scope();

    let from_grandchild = grandchild.resolve_service(&session()).unwrap();
    let from_root = root.resolve_service(&session()).unwrap();

    assert!(Arc::ptr_eq(&from_grandchild, &from_root));
    assert_eq!(as_text(&from_root), "Session#1");
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(root.shared_instance_count(), 1);
    assert_eq!(grandchild.shared_instance_count(), 0);
}

#[test]
fn test_scope_hierarchy() {
    let (root, _) = setup(SharingMode::UniquePerRequest);
    let child = root.begin_lifetime_scope();

    assert!(root.is_root());
    assert!(!child.is_root());
    assert_eq!(child.root_scope().id(), root.id());
    assert_ne!(child.id(), root.id());
    assert_eq!(child.max_resolve_depth(), root.max_resolve_depth());
}
