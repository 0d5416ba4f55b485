//! Structural centrality used by the correlation stage.
//!
//! # Overview
//!
//! The correlation battery pairs each decomposition term with two structural
//! measures a caller normally supplies on the input nodes:
//!
//! - **Betweenness centrality** (`betweenness`): how often a node bridges
//!   shortest paths between others.
//! - **Local clustering** (`clustering`): how tied a node's neighbors are to
//!   one another.
//!
//! Both operate on the undirected view of the [`SymmetrizedGraph`] (its
//! successor sets) and return scores indexed by node index.
//!
//! # Usage
//!
//! ```rust,ignore
//! use constraint_core::metrics::fill_missing_centrality;
//!
//! let filled = fill_missing_centrality(&mut sg);
//! ```

pub mod betweenness;
pub mod clustering;

use tracing::debug;

use crate::graph::normalize::SymmetrizedGraph;

pub use betweenness::betweenness_centrality;
pub use clustering::local_clustering;

/// Compute centrality for nodes that lack it. Supplied values are kept.
///
/// Returns the number of nodes that received at least one computed value.
pub fn fill_missing_centrality(sg: &mut SymmetrizedGraph) -> usize {
    let needs_betweenness = sg.graph.node_weights().any(|n| n.betweenness.is_none());
    let needs_clustering = sg.graph.node_weights().any(|n| n.clustering.is_none());
    if !needs_betweenness && !needs_clustering {
        return 0;
    }

    let bc = if needs_betweenness {
        betweenness_centrality(sg)
    } else {
        Vec::new()
    };
    let cl = if needs_clustering {
        local_clustering(sg)
    } else {
        Vec::new()
    };

    let mut filled = 0;
    for (i, node) in sg.graph.node_weights_mut().enumerate() {
        let mut touched = false;
        if node.betweenness.is_none() {
            node.betweenness = bc.get(i).copied();
            touched = true;
        }
        if node.clustering.is_none() {
            node.clustering = cl.get(i).copied();
            touched = true;
        }
        if touched {
            filled += 1;
        }
    }

    debug!(filled, "filled missing centrality");
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build::{InputGraph, NodeAttrs};

    #[test]
    fn supplied_values_are_kept() {
        let mut g = InputGraph::new();
        g.add_node("A", NodeAttrs::unit().with_centrality(0.9, 0.1)).unwrap();
        g.add_node("B", NodeAttrs::unit()).unwrap();
        g.add_node("C", NodeAttrs::unit()).unwrap();
        g.add_edge("A", "B", 1.0).unwrap();
        g.add_edge("B", "C", 1.0).unwrap();
        let mut sg = SymmetrizedGraph::from_input(g);

        assert_eq!(fill_missing_centrality(&mut sg), 2);
        assert_eq!(sg.node("A").unwrap().betweenness, Some(0.9));
        assert_eq!(sg.node("A").unwrap().clustering, Some(0.1));
        assert_eq!(sg.node("B").unwrap().betweenness, Some(1.0));
        assert_eq!(sg.node("C").unwrap().clustering, Some(0.0));
    }

    #[test]
    fn nothing_to_fill() {
        let mut g = InputGraph::new();
        g.add_node("A", NodeAttrs::unit().with_centrality(0.0, 0.0)).unwrap();
        let mut sg = SymmetrizedGraph::from_input(g);
        assert_eq!(fill_missing_centrality(&mut sg), 0);
    }
}
