//! Resolution-stack cycle detection for chains the graph check never saw.

use trellis_di::{Constructor, DiError, Resolver, ServiceContainer, key_of_type};

struct Alpha;
struct Beta;

fn cyclic_container() -> ServiceContainer {
    let container = ServiceContainer::new();
    container.register_transient_ctors(vec![Constructor::new(
        vec![key_of_type::<Beta>()],
        |ctx| {
            ctx.get::<Beta>()?;
            Ok(Alpha)
        },
    )]);
    container.register_transient_ctors(vec![Constructor::new(
        vec![key_of_type::<Alpha>()],
        |ctx| {
            ctx.get::<Alpha>()?;
            Ok(Beta)
        },
    )]);
    container
}

#[test]
fn mutual_dependency_fails_with_full_path() {
    let container = cyclic_container();
    match container.resolve::<Alpha>() {
        Err(DiError::Circular(path)) => {
            assert_eq!(path.len(), 3);
            assert!(path[0].contains("Alpha"));
            assert!(path[1].contains("Beta"));
            assert!(path[2].contains("Alpha"));
        }
        other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
    }
}

#[test]
fn try_resolve_swallows_the_cycle() {
    let container = cyclic_container();
    assert!(container.try_resolve::<Beta>().is_none());
}

#[test]
fn container_recovers_after_a_caught_cycle() {
    struct Standalone;

    let container = cyclic_container();
    container.register_singleton(Standalone);

    assert!(container.resolve::<Alpha>().is_err());
    // The resolution stack is fully unwound, so unrelated resolutions
    // still work on this thread.
    assert!(container.resolve::<Standalone>().is_ok());
    assert!(container.resolve::<Alpha>().is_err());
}

#[test]
fn self_referential_factory_is_detected() {
    struct Selfish;

    let container = ServiceContainer::new();
    container.register_transient_ctors(vec![Constructor::new(
        vec![key_of_type::<Selfish>()],
        |ctx| {
            ctx.get::<Selfish>()?;
            Ok(Selfish)
        },
    )]);

    match container.resolve::<Selfish>() {
        Err(DiError::Circular(path)) => {
            assert_eq!(path.len(), 2);
            assert_eq!(path[0], path[1]);
        }
        other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
    }
}

#[test]
fn cycle_does_not_trigger_candidate_fallback() {
    struct Loopy {
        via_fallback: bool,
    }

    let container = ServiceContainer::new();
    container.register_transient_ctors(vec![
        Constructor::new(vec![key_of_type::<Loopy>()], |ctx| {
            ctx.get::<Loopy>()?;
            Ok(Loopy { via_fallback: false })
        }),
        Constructor::zero(|| Loopy { via_fallback: true }),
    ]);

    // The cycle aborts the whole resolution instead of silently building
    // the zero-requirement fallback.
    match container.resolve::<Loopy>() {
        Err(DiError::Circular(_)) => {}
        other => panic!("unexpected outcome: {:?}", other.map(|o| o.via_fallback)),
    }
}
