//! Diagnostic reporting over the dependency graph.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::key::Key;

use super::ComponentRegistration;

/// Coarse complexity grade derived from graph shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityRating {
    /// Shallow graph with few dependencies per component.
    Low,
    /// Noticeable chains or fan-out; still easy to reason about.
    Moderate,
    /// Deep chains or heavy fan-out; worth simplifying.
    High,
}

impl fmt::Display for ComplexityRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityRating::Low => write!(f, "Low"),
            ComplexityRating::Moderate => write!(f, "Moderate"),
            ComplexityRating::High => write!(f, "High"),
        }
    }
}

/// Summary statistics over the dependency graph. Reporting only; nothing
/// reads these numbers back into behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct DependencyAnalysis {
    /// Declared dependency edges across all components.
    pub total_dependencies: usize,
    /// Largest dependency list on a single component.
    pub max_per_component: usize,
    /// Mean dependency list length.
    pub avg_per_component: f64,
    /// Node count of the longest registered dependency chain.
    pub longest_chain: usize,
    /// Grade derived from chain depth and average fan-out.
    pub complexity: ComplexityRating,
}

pub(crate) fn analyze(
    registrations: &HashMap<Key, ComponentRegistration>,
) -> DependencyAnalysis {
    let total: usize = registrations.values().map(|reg| reg.dependencies.len()).sum();
    let max = registrations
        .values()
        .map(|reg| reg.dependencies.len())
        .max()
        .unwrap_or(0);
    let avg = if registrations.is_empty() {
        0.0
    } else {
        total as f64 / registrations.len() as f64
    };

    let mut memo: HashMap<Key, usize> = HashMap::new();
    let longest = registrations
        .keys()
        .map(|key| chain_depth(*key, registrations, &mut memo, &mut HashSet::new()))
        .max()
        .unwrap_or(0);

    let complexity = if longest > 6 || avg > 3.0 {
        ComplexityRating::High
    } else if longest > 3 || avg > 1.5 {
        ComplexityRating::Moderate
    } else {
        ComplexityRating::Low
    };

    DependencyAnalysis {
        total_dependencies: total,
        max_per_component: max,
        avg_per_component: avg,
        longest_chain: longest,
        complexity,
    }
}

/// Longest chain rooted at `node`, counted in nodes. Already-seen nodes on
/// the current path contribute nothing, so a cyclic graph (which validation
/// reports separately) terminates instead of recursing forever.
fn chain_depth(
    node: Key,
    registrations: &HashMap<Key, ComponentRegistration>,
    memo: &mut HashMap<Key, usize>,
    on_path: &mut HashSet<Key>,
) -> usize {
    if let Some(depth) = memo.get(&node) {
        return *depth;
    }
    if !on_path.insert(node) {
        return 0;
    }

    let deepest = registrations
        .get(&node)
        .map(|reg| {
            reg.dependencies
                .iter()
                .filter(|dep| registrations.contains_key(dep))
                .map(|dep| chain_depth(*dep, registrations, memo, on_path))
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0);

    on_path.remove(&node);
    let depth = deepest + 1;
    memo.insert(node, depth);
    depth
}
