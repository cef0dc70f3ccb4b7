//! Dependency graph statistics exposed for diagnostics.

use trellis_di::{ComplexityRating, ComponentRegistry, Manager, key_of_type};

#[derive(Default)]
struct D0;
impl Manager for D0 {}

#[derive(Default)]
struct D1;
impl Manager for D1 {
    const DEPENDENCY_AWARE: bool = true;
}

#[derive(Default)]
struct D2;
impl Manager for D2 {
    const DEPENDENCY_AWARE: bool = true;
}

#[derive(Default)]
struct D3;
impl Manager for D3 {
    const DEPENDENCY_AWARE: bool = true;
}

#[derive(Default)]
struct D4;
impl Manager for D4 {
    const DEPENDENCY_AWARE: bool = true;
}

#[test]
fn empty_registry_reads_as_low_complexity() {
    let registry = ComponentRegistry::new();
    let analysis = registry.analyze_dependencies();
    assert_eq!(analysis.total_dependencies, 0);
    assert_eq!(analysis.max_per_component, 0);
    assert_eq!(analysis.avg_per_component, 0.0);
    assert_eq!(analysis.longest_chain, 0);
    assert_eq!(analysis.complexity, ComplexityRating::Low);
}

#[test]
fn counts_and_chain_length_reflect_the_graph() {
    let registry = ComponentRegistry::new();
    registry.register::<D0>(0, vec![]);
    registry.register::<D1>(0, vec![key_of_type::<D0>()]);
    registry.register::<D2>(0, vec![key_of_type::<D1>(), key_of_type::<D0>()]);

    let analysis = registry.analyze_dependencies();
    assert_eq!(analysis.total_dependencies, 3);
    assert_eq!(analysis.max_per_component, 2);
    assert!((analysis.avg_per_component - 1.0).abs() < f64::EPSILON);
    // D2 -> D1 -> D0 is three nodes.
    assert_eq!(analysis.longest_chain, 3);
    assert_eq!(analysis.complexity, ComplexityRating::Low);
}

#[test]
fn deep_chain_raises_the_complexity_grade() {
    let registry = ComponentRegistry::new();
    registry.register::<D0>(0, vec![]);
    registry.register::<D1>(0, vec![key_of_type::<D0>()]);
    registry.register::<D2>(0, vec![key_of_type::<D1>()]);
    registry.register::<D3>(0, vec![key_of_type::<D2>()]);
    registry.register::<D4>(0, vec![key_of_type::<D3>()]);

    let analysis = registry.analyze_dependencies();
    assert_eq!(analysis.longest_chain, 5);
    assert_eq!(analysis.complexity, ComplexityRating::Moderate);
}

#[test]
fn unregistered_dependencies_count_toward_totals_only() {
    struct Ghost;

    let registry = ComponentRegistry::new();
    registry.register::<D1>(0, vec![key_of_type::<Ghost>()]);

    let analysis = registry.analyze_dependencies();
    assert_eq!(analysis.total_dependencies, 1);
    // The edge has no registered target, so no chain forms through it.
    assert_eq!(analysis.longest_chain, 1);
}
