//! Quadriad terms: open-quadriad redundancy (IR) and its closed counterpart.
//!
//! # Overview
//!
//! Squaring the indirect path sum `Σ_q pij(i,q)·pij(q,j)` produces cross
//! products between two *different* shared alters `q` and `k` of the pair
//! `(i, j)`. Each unordered `{q, k}` contributes
//!
//! ```text
//! 2 · conc_j · pij(i,q) · pij(i,k) · pij(q,j) · pij(k,j)
//! ```
//!
//! and falls into one of two classes:
//!
//! - **open** (`k ∉ successors(q)`): indirect redundancy, accumulated into
//!   `IR` by the main pass;
//! - **closed** (`k ∈ successors(q)`): community closure, which the main pass
//!   derives residually as `CC = Ci − (DD + TB + ID + IR)`.
//!
//! ## Deduplication
//!
//! Each unordered pair is visited once by requiring `k > q` under node-index
//! order. The index is the insertion order fixed in
//! [`crate::graph::build`]; every comparison in this module uses it, and
//! nothing else may be substituted for it.
//!
//! ## Cross-checks
//!
//! [`direct_closure`] accumulates the closed class explicitly and
//! [`brute_force_indirect_redundancy`] re-derives `IR` from raw edge
//! existence. Neither is on the main path; [`crate::verify`] and the tests use
//! them to confirm the residual and incremental forms.

use fixedbitset::FixedBitSet;
use petgraph::graph::NodeIndex;

use crate::error::DecompError;
use crate::graph::normalize::SymmetrizedGraph;

/// Shared alters `k` with `k > q` that are **not** successors of `q`.
pub fn open_quadriads<'a>(
    shared: &'a FixedBitSet,
    q_successors: &'a FixedBitSet,
    q: NodeIndex,
) -> impl Iterator<Item = NodeIndex> + 'a {
    shared
        .ones()
        .filter(move |&k| k > q.index() && !q_successors.contains(k))
        .map(NodeIndex::new)
}

/// Shared alters `k` with `k > q` that **are** successors of `q`.
pub fn closed_quadriads<'a>(
    shared: &'a FixedBitSet,
    q_successors: &'a FixedBitSet,
    q: NodeIndex,
) -> impl Iterator<Item = NodeIndex> + 'a {
    shared
        .ones()
        .filter(move |&k| k > q.index() && q_successors.contains(k))
        .map(NodeIndex::new)
}

/// Contribution of one unordered `{q, k}` pair to the quadriad terms of `i`.
#[must_use]
pub fn pair_term(
    sg: &SymmetrizedGraph,
    i: NodeIndex,
    j: NodeIndex,
    q: NodeIndex,
    k: NodeIndex,
    conc_j: f64,
) -> f64 {
    2.0 * conc_j * sg.pij(i, q) * sg.pij(i, k) * sg.pij(q, j) * sg.pij(k, j)
}

/// IR contribution of shared alter `q` for the pair `(i, j)`.
#[must_use]
pub fn open_quadriad_term(
    sg: &SymmetrizedGraph,
    i: NodeIndex,
    j: NodeIndex,
    q: NodeIndex,
    shared: &FixedBitSet,
    conc_j: f64,
) -> f64 {
    open_quadriads(shared, sg.successors_of(q), q)
        .map(|k| pair_term(sg, i, j, q, k, conc_j))
        .sum()
}

/// Closed-quadriad dependence of `i`, accumulated directly.
///
/// Requires the dyadic stage to have run. Isolates return 0.
///
/// # Errors
///
/// Returns [`DecompError::MissingAttribute`] if a successor has no `conc`.
pub fn direct_closure(sg: &SymmetrizedGraph, i: NodeIndex) -> Result<f64, DecompError> {
    if sg.graph[i].isolate {
        return Ok(0.0);
    }
    let mut cc = 0.0;
    for j in sg.successor_indices(i) {
        let conc_j = sg.conc(j)?;
        let shared = sg.shared_alters(i, j);
        for q in shared.ones().map(NodeIndex::new) {
            cc += closed_quadriads(&shared, sg.successors_of(q), q)
                .map(|k| pair_term(sg, i, j, q, k, conc_j))
                .sum::<f64>();
        }
    }
    Ok(cc)
}

/// Indirect redundancy of `i` by exhaustive enumeration of `(j, q, k)`.
///
/// Uses edge lookups only (no successor bitsets), so it checks the
/// incremental computation independently. O(n³·deg); for small graphs.
///
/// # Errors
///
/// Returns [`DecompError::MissingAttribute`] if a successor has no `conc`.
pub fn brute_force_indirect_redundancy(
    sg: &SymmetrizedGraph,
    i: NodeIndex,
) -> Result<f64, DecompError> {
    if sg.graph[i].isolate {
        return Ok(0.0);
    }
    let g = &sg.graph;
    let has = |a: NodeIndex, b: NodeIndex| g.find_edge(a, b).is_some();

    let mut ir = 0.0;
    for j in g.node_indices().filter(|&j| has(i, j)) {
        let conc_j = sg.conc(j)?;
        for q in g.node_indices() {
            if !(has(i, q) && has(j, q)) {
                continue;
            }
            for k in g.node_indices() {
                if k <= q || !(has(i, k) && has(j, k)) || has(q, k) {
                    continue;
                }
                ir += pair_term(sg, i, j, q, k, conc_j);
            }
        }
    }
    Ok(ir)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
