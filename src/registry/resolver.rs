//! Registration-time dependency graph validation.
//!
//! Validation is a pure pass over the registration map: it reports every
//! missing dependency, at most one circular chain, and the informational
//! warnings together in one report rather than stopping at the first
//! problem. Nothing here mutates the registry.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::key::Key;

use super::ComponentRegistration;

/// A non-fatal observation about the registration set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Several components share a priority value, so their relative order
    /// falls back to registration sequence.
    DuplicatePriority {
        /// The shared priority value.
        priority: i32,
        /// Every component registered at that priority.
        components: Vec<&'static str>,
    },
    /// The component declares dependencies but its type does not opt into
    /// the dependency-aware lifecycle notification.
    NotDependencyAware {
        /// The component carrying the declarations.
        component: &'static str,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::DuplicatePriority { priority, components } => write!(
                f,
                "Priority {} shared by: {}",
                priority,
                components.join(", ")
            ),
            ValidationWarning::NotDependencyAware { component } => write!(
                f,
                "Component {} declares dependencies but is not dependency-aware",
                component
            ),
        }
    }
}

/// Outcome of validating the registration set.
///
/// Missing dependencies and cycles make the set invalid; warnings never do.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// True when there are no missing dependencies and no cycle.
    pub is_valid: bool,
    /// One message per missing edge, every miss collected.
    pub missing_dependencies: Vec<String>,
    /// Whether the graph contains at least one cycle.
    pub has_circular_dependencies: bool,
    /// The circular chain, first node repeated at the end, e.g.
    /// `["X", "Y", "X"]`.
    pub cycle: Option<Vec<&'static str>>,
    /// Informational observations; never affect validity.
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// All fatal issues joined into one human-readable block, empty when
    /// the set is valid.
    pub fn format_issues(&self) -> String {
        let mut lines: Vec<String> = self.missing_dependencies.clone();
        if let Some(cycle) = &self.cycle {
            lines.push(format!("Circular dependency: {}", cycle.join(" -> ")));
        }
        lines.join("\n")
    }
}

/// Validates every declared dependency edge and searches the graph for a
/// cycle.
///
/// Components are visited in display-name order, so the reported cycle is
/// identical across runs for the same registration set. Edges pointing at
/// unregistered types are reported as missing and excluded from the cycle
/// search.
pub(crate) fn validate(registrations: &HashMap<Key, ComponentRegistration>) -> ValidationReport {
    let mut missing = Vec::new();
    for reg in sorted_regs(registrations) {
        for dep in &reg.dependencies {
            if !registrations.contains_key(dep) {
                missing.push(format!(
                    "Component {} depends on unregistered type {}",
                    reg.key.display_name(),
                    dep.display_name()
                ));
            }
        }
    }

    let cycle = find_cycle(registrations);

    let mut warnings = Vec::new();
    let mut by_priority: BTreeMap<i32, Vec<&'static str>> = BTreeMap::new();
    for reg in sorted_regs(registrations) {
        by_priority.entry(reg.priority).or_default().push(reg.key.display_name());
    }
    for (priority, components) in by_priority {
        if components.len() > 1 {
            warnings.push(ValidationWarning::DuplicatePriority { priority, components });
        }
    }
    for reg in sorted_regs(registrations) {
        if !reg.dependencies.is_empty() && !reg.dependency_aware {
            warnings.push(ValidationWarning::NotDependencyAware {
                component: reg.key.display_name(),
            });
        }
    }

    ValidationReport {
        is_valid: missing.is_empty() && cycle.is_none(),
        missing_dependencies: missing,
        has_circular_dependencies: cycle.is_some(),
        cycle,
        warnings,
    }
}

fn sorted_regs(
    registrations: &HashMap<Key, ComponentRegistration>,
) -> impl Iterator<Item = &ComponentRegistration> {
    let mut regs: Vec<&ComponentRegistration> = registrations.values().collect();
    regs.sort_by_key(|reg| reg.key.display_name());
    regs.into_iter()
}

/// Depth-first search for the first cycle in display-name visit order.
///
/// The returned path is the exact suffix of the search path from the
/// repeated node through the current one, with the repeated node appended,
/// so `X -> Y -> X` reports as `["X", "Y", "X"]` and a self-dependency as
/// `["X", "X"]`.
fn find_cycle(registrations: &HashMap<Key, ComponentRegistration>) -> Option<Vec<&'static str>> {
    let mut visited: HashSet<Key> = HashSet::new();
    let mut on_stack: HashSet<Key> = HashSet::new();
    let mut path: Vec<Key> = Vec::new();

    for reg in sorted_regs(registrations) {
        if !visited.contains(&reg.key) {
            if let Some(cycle) =
                dfs(reg.key, registrations, &mut visited, &mut on_stack, &mut path)
            {
                return Some(cycle);
            }
        }
    }
    None
}

fn dfs(
    node: Key,
    registrations: &HashMap<Key, ComponentRegistration>,
    visited: &mut HashSet<Key>,
    on_stack: &mut HashSet<Key>,
    path: &mut Vec<Key>,
) -> Option<Vec<&'static str>> {
    visited.insert(node);
    on_stack.insert(node);
    path.push(node);

    if let Some(reg) = registrations.get(&node) {
        let mut deps = reg.dependencies.clone();
        deps.sort();
        for dep in deps {
            if !registrations.contains_key(&dep) {
                continue;
            }
            if on_stack.contains(&dep) {
                let start = path.iter().position(|k| *k == dep).unwrap_or(0);
                let mut cycle: Vec<&'static str> =
                    path[start..].iter().map(|k| k.display_name()).collect();
                cycle.push(dep.display_name());
                return Some(cycle);
            }
            if !visited.contains(&dep) {
                if let Some(cycle) = dfs(dep, registrations, visited, on_stack, path) {
                    return Some(cycle);
                }
            }
        }
    }

    on_stack.remove(&node);
    path.pop();
    None
}
