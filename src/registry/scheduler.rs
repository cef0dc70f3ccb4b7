//! Priority-aware topological ordering of component registrations.

use std::collections::{HashMap, HashSet};

use crate::error::{DiError, DiResult};
use crate::key::Key;

use super::ComponentRegistration;

/// Computes the initialization order for the registration set.
///
/// Kahn-style: candidates are kept sorted by priority (higher first) with
/// registration sequence breaking ties, and each pass places every
/// candidate whose dependencies are already placed or unregistered. A pass
/// that places nothing while candidates remain means the remainder is
/// cyclic.
///
/// The order is fully deterministic for a fixed registration sequence.
pub(crate) fn compute_order(
    registrations: &HashMap<Key, ComponentRegistration>,
) -> DiResult<Vec<Key>> {
    let mut remaining: Vec<&ComponentRegistration> = registrations.values().collect();
    remaining.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));

    let mut placed: HashSet<Key> = HashSet::new();
    let mut order: Vec<Key> = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let before = remaining.len();
        remaining.retain(|reg| {
            // Unregistered dependencies cannot gate placement; validation
            // reports them separately.
            let eligible = reg
                .dependencies
                .iter()
                .all(|dep| placed.contains(dep) || !registrations.contains_key(dep));
            if eligible {
                placed.insert(reg.key);
                order.push(reg.key);
            }
            !eligible
        });

        if remaining.len() == before {
            let mut stuck: Vec<&'static str> =
                remaining.iter().map(|reg| reg.key.display_name()).collect();
            stuck.sort_unstable();
            return Err(DiError::Circular(stuck));
        }
    }

    Ok(order)
}
