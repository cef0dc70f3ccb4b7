//! Service container lifetimes and resolution surface.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use trellis_di::{Constructor, DiError, Resolver, ServiceContainer, key_of_type};

struct Logger {
    name: &'static str,
}

struct Worker {
    logger: Arc<Logger>,
}

#[test]
fn singleton_resolves_to_same_instance() {
    let container = ServiceContainer::new();
    container.register_singleton(Logger { name: "app" });

    let a = container.resolve::<Logger>().unwrap();
    let b = container.resolve::<Logger>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.name, "app");
    assert_eq!(container.service_count(), 1);
    assert_eq!(container.singleton_count(), 1);
}

#[test]
fn lazy_singleton_constructs_once() {
    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Expensive;

    let container = ServiceContainer::new();
    container.register_singleton_ctors(vec![Constructor::zero(|| {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        Expensive
    })]);

    assert_eq!(container.singleton_count(), 0);
    let a = container.resolve::<Expensive>().unwrap();
    let b = container.resolve::<Expensive>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    assert_eq!(container.singleton_count(), 1);
}

#[test]
fn transient_resolves_to_distinct_instances() {
    struct Request;

    let container = ServiceContainer::new();
    container.register_transient(|| Request);

    let a = container.resolve::<Request>().unwrap();
    let b = container.resolve::<Request>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(container.singleton_count(), 0);
}

#[test]
fn transient_workers_share_singleton_logger() {
    let container = ServiceContainer::new();
    container.register_singleton(Logger { name: "shared" });
    container.register_transient_ctors(vec![Constructor::new(
        vec![key_of_type::<Logger>()],
        |ctx| Ok(Worker { logger: ctx.get::<Logger>()? }),
    )]);

    let w1 = container.resolve::<Worker>().unwrap();
    let w2 = container.resolve::<Worker>().unwrap();
    assert!(!Arc::ptr_eq(&w1, &w2));
    assert!(Arc::ptr_eq(&w1.logger, &w2.logger));
}

#[test]
fn factory_runs_on_every_resolution() {
    static CALLS: AtomicUsize = AtomicUsize::new(0);

    struct Stamp(usize);

    let container = ServiceContainer::new();
    container.register_factory(|_| Ok(Stamp(CALLS.fetch_add(1, Ordering::SeqCst))));

    let a = container.resolve::<Stamp>().unwrap();
    let b = container.resolve::<Stamp>().unwrap();
    assert_eq!(a.0, 0);
    assert_eq!(b.0, 1);
}

#[test]
fn unregistered_type_errors_and_try_variant_is_silent() {
    struct Missing;

    let container = ServiceContainer::new();
    match container.resolve::<Missing>() {
        Err(DiError::Unregistered(name)) => assert!(name.contains("Missing")),
        other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
    }
    assert!(container.try_resolve::<Missing>().is_none());
}

#[test]
fn candidate_fallback_tries_fewer_requirements() {
    struct Service {
        with_logger: bool,
    }

    let container = ServiceContainer::new();
    // Logger is never registered, so the two-requirement candidate fails
    // and the zero-requirement one is used.
    container.register_transient_ctors(vec![
        Constructor::new(vec![key_of_type::<Logger>()], |ctx| {
            ctx.get::<Logger>()?;
            Ok(Service { with_logger: true })
        }),
        Constructor::zero(|| Service { with_logger: false }),
    ]);

    let service = container.resolve::<Service>().unwrap();
    assert!(!service.with_logger);
}

#[test]
fn exhausted_candidates_report_creation_failure() {
    struct Service;

    let container = ServiceContainer::new();
    container.register_transient_ctors(vec![Constructor::new(
        vec![key_of_type::<Logger>()],
        |ctx| {
            ctx.get::<Logger>()?;
            Ok(Service)
        },
    )]);

    match container.resolve::<Service>() {
        Err(DiError::CreationFailed(name, reason)) => {
            assert!(name.contains("Service"));
            assert!(reason.contains("not registered"));
        }
        other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
    }
}

#[test]
fn trait_registration_resolves_through_get_trait() {
    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;
    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    let container = ServiceContainer::new();
    container.register_singleton_trait::<dyn Greeter>(Arc::new(English));

    let a = container.get_trait::<dyn Greeter>().unwrap();
    let b = container.resolve_trait::<dyn Greeter>().unwrap();
    assert_eq!(a.greet(), "hello");
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn clear_drops_registrations_but_not_handles() {
    let container = ServiceContainer::new();
    container.register_singleton(Logger { name: "kept" });
    let handle = container.resolve::<Logger>().unwrap();

    container.clear();
    assert_eq!(container.service_count(), 0);
    assert!(container.try_resolve::<Logger>().is_none());
    assert_eq!(handle.name, "kept");
}

#[test]
fn reregistration_replaces_previous_entry() {
    let container = ServiceContainer::new();
    container.register_singleton(Logger { name: "first" });
    container.register_singleton(Logger { name: "second" });

    assert_eq!(container.service_count(), 1);
    let logger = container.resolve::<Logger>().unwrap();
    assert_eq!(logger.name, "second");
}

#[test]
fn registered_lifetime_reports_the_declared_kind() {
    use trellis_di::{Key, Lifetime};

    struct Request;

    let container = ServiceContainer::new();
    container.register_singleton(Logger { name: "l" });
    container.register_transient(|| Request);

    let logger_key: Key = key_of_type::<Logger>();
    assert_eq!(container.registered_lifetime(&logger_key), Some(Lifetime::Singleton));
    assert_eq!(
        container.registered_lifetime(&key_of_type::<Request>()),
        Some(Lifetime::Transient)
    );
    assert_eq!(container.registered_lifetime(&key_of_type::<u8>()), None);
    assert!(container.contains(&logger_key));
}
