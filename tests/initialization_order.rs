//! Scheduler ordering: dependencies first, then priority, then
//! registration sequence.

use trellis_di::{ComponentRegistry, DiError, Manager, key_of_type};

#[derive(Default)]
struct A;
impl Manager for A {
    const DEPENDENCY_AWARE: bool = true;
}

#[derive(Default)]
struct B;
impl Manager for B {
    const DEPENDENCY_AWARE: bool = true;
}

#[derive(Default)]
struct C;
impl Manager for C {}

fn short(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

#[test]
fn chain_orders_dependency_before_dependent() {
    let registry = ComponentRegistry::new();
    registry.register::<A>(0, vec![key_of_type::<B>()]);
    registry.register::<B>(0, vec![key_of_type::<C>()]);
    registry.register::<C>(0, vec![]);

    let order = registry.initialization_order().unwrap();
    let names: Vec<&str> = order.iter().map(|n| short(n)).collect();
    assert_eq!(names, ["C", "B", "A"]);
}

#[test]
fn higher_priority_initializes_earlier() {
    let registry = ComponentRegistry::new();
    registry.register::<A>(0, vec![]);
    registry.register::<B>(100, vec![]);
    registry.register::<C>(50, vec![]);

    let order = registry.initialization_order().unwrap();
    let names: Vec<&str> = order.iter().map(|n| short(n)).collect();
    assert_eq!(names, ["B", "C", "A"]);
}

#[test]
fn equal_priority_ties_break_by_registration_sequence() {
    let registry = ComponentRegistry::new();
    registry.register::<B>(10, vec![]);
    registry.register::<A>(10, vec![]);
    registry.register::<C>(10, vec![]);

    let order = registry.initialization_order().unwrap();
    let names: Vec<&str> = order.iter().map(|n| short(n)).collect();
    assert_eq!(names, ["B", "A", "C"]);
}

#[test]
fn dependency_outranks_priority() {
    // A has the highest priority but must still wait for B.
    let registry = ComponentRegistry::new();
    registry.register::<A>(1000, vec![key_of_type::<B>()]);
    registry.register::<B>(0, vec![]);

    let order = registry.initialization_order().unwrap();
    let names: Vec<&str> = order.iter().map(|n| short(n)).collect();
    assert_eq!(names, ["B", "A"]);
}

#[test]
fn unregistered_dependency_does_not_gate_placement() {
    struct Ghost;

    let registry = ComponentRegistry::new();
    registry.register::<A>(0, vec![key_of_type::<Ghost>()]);

    let order = registry.initialization_order().unwrap();
    assert_eq!(order.len(), 1);
}

#[test]
fn cyclic_remainder_names_the_stuck_set() {
    let registry = ComponentRegistry::new();
    registry.register::<A>(0, vec![key_of_type::<B>()]);
    registry.register::<B>(0, vec![key_of_type::<A>()]);
    registry.register::<C>(0, vec![]);

    match registry.initialization_order() {
        Err(DiError::Circular(stuck)) => {
            let names: Vec<&str> = stuck.iter().map(|n| short(n)).collect();
            assert_eq!(names, ["A", "B"]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn order_is_stable_across_repeated_computation() {
    let registry = ComponentRegistry::new();
    registry.register::<A>(5, vec![key_of_type::<C>()]);
    registry.register::<B>(5, vec![key_of_type::<C>()]);
    registry.register::<C>(0, vec![]);

    let first = registry.initialization_order().unwrap();
    for _ in 0..10 {
        assert_eq!(registry.initialization_order().unwrap(), first);
    }
}
