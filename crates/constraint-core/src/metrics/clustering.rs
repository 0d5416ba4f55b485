//! Local clustering coefficient on the undirected view.
//!
//! For a node with `k` neighbors and `T` ties among those neighbors,
//! `c = 2T / (k(k-1))`; nodes with fewer than two neighbors score 0.
//! Weights are ignored.

use tracing::instrument;

use crate::graph::normalize::SymmetrizedGraph;

/// Local clustering for every node, indexed by node index.
#[must_use]
#[instrument(skip(sg), fields(nodes = sg.node_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn local_clustering(sg: &SymmetrizedGraph) -> Vec<f64> {
    sg.graph
        .node_indices()
        .map(|i| {
            let neighbors = sg.successors_of(i);
            let k = neighbors.count_ones(..);
            if k < 2 {
                return 0.0;
            }
            // Each tie among neighbors is seen from both ends.
            let seen: usize = neighbors
                .ones()
                .map(|q| sg.successors[q].intersection(neighbors).count())
                .sum();
            seen as f64 / (k * (k - 1)) as f64
        })
        .collect()
}
