//! Post-resolution interceptor binding.
//!
//! Runs once the frontier is empty, because applicability depends on each
//! component's final, specialized type. An interceptor applies to a
//! component when the oracle says its type intercepts the component's type
//! and the component carries every tag of the interceptor.

use crate::oracle::TypeOracle;

use super::state::ResolvedNode;

/// Interceptor indexes for every node, in plan order.
pub(crate) fn bind_interceptors(oracle: &dyn TypeOracle, nodes: &[ResolvedNode]) -> Vec<Vec<usize>> {
    let interceptors: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| oracle.intercepted_type(&node.declaration.ty).is_some())
        .map(|(index, _)| index)
        .collect();
    tracing::trace!("Binding {} interceptor(s) over {} component(s)", interceptors.len(), nodes.len());

    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            // Proxies forward to an instance that is intercepted itself
            if node.is_proxy() {
                return Vec::new();
            }
            interceptors
                .iter()
                .copied()
                .filter(|&i| i != index)
                .filter(|&i| {
                    let interceptor = &nodes[i].declaration;
                    oracle.is_interceptor_for(&interceptor.ty, &node.declaration.ty)
                        && node.declaration.tags.is_superset_of(&interceptor.tags)
                })
                .collect()
        })
        .collect()
}
