//! Triadic stage: indirect ties, total constraint and its residual split.
//!
//! For every node `i` with successors, and each successor `j`, with `S = successors(i) ∩
//! successors(j)`:
//!
//! ```text
//! agg(i,j) = Σ_{q∈S} pij(i,q)·pij(q,j)
//! Ci      += (pij(i,j) + agg(i,j))² · conc_j
//! TB      += 2 · pij(i,j) · agg(i,j) · conc_j
//! ID      += Σ_{q∈S} (pij(i,j)·pij(j,q))² · conc_q
//! IR      += open quadriads over S            (see [`super::quadriad`])
//! ```
//!
//! After all successors, `CC = Ci − (DD + TB + ID + IR)` and `QS = CC + IR`.
//!
//! Isolates (no successors) take `Ci = 1` and zero for every other term. A
//! node whose ties all weigh 0 has every `pij` undefined, read as 0, so its
//! `Ci` and every component come out 0 and the identity still holds.

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use super::quadriad::open_quadriad_term;
use crate::error::DecompError;
use crate::graph::normalize::SymmetrizedGraph;

/// Per-node accumulators for one pass over a node's successors.
#[derive(Debug, Default, Clone, Copy)]
struct Accum {
    ci: f64,
    tb: f64,
    id: f64,
    ir: f64,
}

/// Run the triadic stage over every node.
///
/// Requires [`super::direct::compute_direct_ties`] to have run.
///
/// # Errors
///
/// Returns [`DecompError::MissingAttribute`] if a successor or shared alter
/// has no `conc`.
#[instrument(skip(sg), fields(nodes = sg.node_count()))]
pub fn compute_indirect(sg: &mut SymmetrizedGraph) -> Result<(), DecompError> {
    let nodes: Vec<NodeIndex> = sg.graph.node_indices().collect();

    for i in nodes {
        if sg.graph[i].isolate {
            let node = &mut sg.graph[i];
            node.ci = 1.0;
            node.tb = 0.0;
            node.id = 0.0;
            node.ir = 0.0;
            node.cc = 0.0;
            node.qs = 0.0;
            continue;
        }

        let mut acc = Accum::default();
        let alters: Vec<NodeIndex> = sg.successor_indices(i).collect();
        for j in alters {
            let agg = accumulate_pair(sg, i, j, &mut acc)?;
            if let Some(e) = sg.graph.find_edge(i, j) {
                sg.graph[e].agg_indirect = agg;
            }
        }

        let node = &mut sg.graph[i];
        node.ci = acc.ci;
        node.tb = acc.tb;
        node.id = acc.id;
        node.ir = acc.ir;
        node.cc = acc.ci - (node.dd + acc.tb + acc.id + acc.ir);
        node.qs = node.cc + acc.ir;
    }

    debug!("triadic stage complete");
    Ok(())
}

/// Fold the `(i, j)` pair into `acc` and return `agg(i, j)`.
fn accumulate_pair(
    sg: &SymmetrizedGraph,
    i: NodeIndex,
    j: NodeIndex,
    acc: &mut Accum,
) -> Result<f64, DecompError> {
    let p_ij = sg.pij(i, j);
    let conc_j = sg.conc(j)?;
    let shared = sg.shared_alters(i, j);

    let mut agg = 0.0;
    for q in shared.ones().map(NodeIndex::new) {
        agg += sg.pij(i, q) * sg.pij(q, j);
        acc.id += (p_ij * sg.pij(j, q)).powi(2) * sg.conc(q)?;
        acc.ir += open_quadriad_term(sg, i, j, q, &shared, conc_j);
    }

    acc.ci += (p_ij + agg).powi(2) * conc_j;
    acc.tb += 2.0 * p_ij * agg * conc_j;
    Ok(agg)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
