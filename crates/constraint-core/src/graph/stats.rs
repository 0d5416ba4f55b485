//! Basic statistics for a symmetrized graph.
//!
//! # Statistics Provided
//!
//! - **node_count**: Total number of nodes.
//! - **edge_count**: Directed edges after symmetrization.
//! - **input_edge_count**: Directed edges before symmetrization.
//! - **reciprocals_added**: Zero-weight reciprocals inserted by the normalizer.
//! - **density**: `edge_count / (node_count * (node_count - 1))` over the
//!   input edges, the directed density a producer would report. Zero for
//!   graphs with fewer than 2 nodes.
//! - **isolate_count**: Nodes without successors.
//! - **max_degree**: Largest successor count.
//! - **component_count**: Connected components of the symmetrized graph.

use petgraph::algo::connected_components;
use serde::Serialize;

use crate::graph::normalize::SymmetrizedGraph;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a symmetrized graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub input_edge_count: usize,
    pub reciprocals_added: usize,
    pub density: f64,
    pub isolate_count: usize,
    pub max_degree: usize,
    pub component_count: usize,
}

impl GraphStats {
    /// Compute statistics from a [`SymmetrizedGraph`].
    #[must_use]
    pub fn from_symmetrized(sg: &SymmetrizedGraph) -> Self {
        let node_count = sg.node_count();
        let edge_count = sg.edge_count();
        let input_edge_count = edge_count - sg.reciprocals_added;

        let degrees = sg.successors.iter().map(|s| s.count_ones(..));
        let max_degree = degrees.clone().max().unwrap_or(0);

        let isolate_count = degrees.filter(|&degree| degree == 0).count();

        Self {
            node_count,
            edge_count,
            input_edge_count,
            reciprocals_added: sg.reciprocals_added,
            density: compute_density(node_count, input_edge_count),
            isolate_count,
            max_degree,
            component_count: connected_components(&sg.graph),
        }
    }
}

/// Directed density; 0.0 for fewer than 2 nodes.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0;
    }
    edge_count as f64 / (node_count * (node_count - 1)) as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
