//! Symmetrization and volume accounting.
//!
//! # Overview
//!
//! The input may be asymmetric: an edge `i → j` without `j → i`. Every
//! downstream stage intersects successor sets, and those intersections are
//! only well-formed when edge *existence* is symmetric. This module provides
//! the normalization step that produces that guarantee:
//!
//! 1. **Reciprocal insertion**: for every `i → j` lacking `j → i`, insert
//!    `j → i` with weight 0. Weights stay asymmetric; only existence is
//!    symmetrized.
//!
//! 2. **Volume accounting**: `output_i = Σ w(i,·)` and
//!    `input_i = Σ w(·,i)` over the symmetrized neighbor set.
//!
//! # Output
//!
//! [`SymmetrizedGraph`] owns the petgraph graph of [`NodeState`] /
//! [`EdgeState`] records plus a successor bitset per node. Node indices are
//! carried over unchanged from [`InputGraph`], so the insertion order remains
//! the deduplication order.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use fixedbitset::FixedBitSet;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use tracing::{debug, instrument};

use crate::config::TieStrengthMethod;
use crate::error::DecompError;
use crate::graph::build::InputGraph;
use crate::graph::state::{EdgeState, NodeState};

// ---------------------------------------------------------------------------
// SymmetrizedGraph
// ---------------------------------------------------------------------------

/// The normalized graph every decomposition stage operates on.
#[derive(Debug, Clone)]
pub struct SymmetrizedGraph {
    /// Directed graph with symmetric edge existence.
    pub graph: DiGraph<NodeState, EdgeState>,
    /// Mapping from label to node index.
    pub node_map: HashMap<String, NodeIndex>,
    /// `successors[i]` has bit `j` set iff `i → j` exists.
    pub successors: Vec<FixedBitSet>,
    /// Tie-strength policy declared by the input, if any.
    pub tie_strength: Option<TieStrengthMethod>,
    /// Graph-level configuration echo from the input.
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Content hash of the input edge list (before symmetrization).
    pub content_hash: String,
    /// Number of zero-weight reciprocal edges inserted.
    pub reciprocals_added: usize,
}

impl SymmetrizedGraph {
    /// Build a [`SymmetrizedGraph`] from an [`InputGraph`], consuming it.
    ///
    /// Steps:
    /// 1. Map input nodes/edges into state records (indices preserved).
    /// 2. Insert missing reciprocal edges with weight 0.
    /// 3. Build successor bitsets.
    /// 4. Accumulate `output` and `input` volumes.
    #[must_use]
    #[instrument(skip(input), fields(nodes = input.node_count(), edges = input.edge_count()))]
    pub fn from_input(input: InputGraph) -> Self {
        let content_hash = input.content_hash();
        let InputGraph {
            graph: raw,
            node_map,
            tie_strength,
            attributes,
        } = input;

        let mut graph: DiGraph<NodeState, EdgeState> = raw.map(
            |_, node| NodeState::from_input(node),
            |_, &weight| EdgeState::new(weight, false),
        );

        // Collect first; can't mutate while iterating edge references.
        let missing: Vec<(NodeIndex, NodeIndex)> = graph
            .edge_references()
            .filter(|e| graph.find_edge(e.target(), e.source()).is_none())
            .map(|e| (e.target(), e.source()))
            .collect();

        let reciprocals_added = missing.len();
        for (a, b) in missing {
            graph.add_edge(a, b, EdgeState::new(0.0, true));
        }
        debug!(reciprocals_added, "symmetrized edge existence");

        let n = graph.node_count();
        let mut successors = vec![FixedBitSet::with_capacity(n); n];
        for e in graph.edge_references() {
            successors[e.source().index()].insert(e.target().index());
        }

        for idx in graph.node_indices() {
            let output: f64 = graph
                .edges_directed(idx, Direction::Outgoing)
                .map(|e| e.weight().weight)
                .sum();
            let input: f64 = graph
                .edges_directed(idx, Direction::Incoming)
                .map(|e| e.weight().weight)
                .sum();
            let node = &mut graph[idx];
            node.output = output;
            node.input = input;
        }

        Self {
            graph,
            node_map,
            successors,
            tie_strength,
            attributes,
            content_hash,
            reciprocals_added,
        }
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of directed edges (after symmetrization).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the node index for a label.
    #[must_use]
    pub fn node_index(&self, label: &str) -> Option<NodeIndex> {
        self.node_map.get(label).copied()
    }

    /// Look up node state by label.
    #[must_use]
    pub fn node(&self, label: &str) -> Option<&NodeState> {
        self.node_index(label).map(|idx| &self.graph[idx])
    }

    /// Look up node state by label, failing on unknown labels.
    ///
    /// # Errors
    ///
    /// Returns [`DecompError::UnknownNode`] if `label` is not in the graph.
    pub fn require_node(&self, label: &str) -> Result<&NodeState, DecompError> {
        self.node(label)
            .ok_or_else(|| DecompError::UnknownNode(label.to_string()))
    }

    /// Look up edge state by endpoint labels.
    #[must_use]
    pub fn edge(&self, ego: &str, alter: &str) -> Option<&EdgeState> {
        let a = self.node_index(ego)?;
        let b = self.node_index(alter)?;
        self.edge_at(a, b)
    }

    /// Look up edge state by endpoint indices.
    #[must_use]
    pub fn edge_at(&self, a: NodeIndex, b: NodeIndex) -> Option<&EdgeState> {
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e))
    }

    /// Weight of `a → b`, or 0 when the edge does not exist.
    #[must_use]
    pub fn weight(&self, a: NodeIndex, b: NodeIndex) -> f64 {
        self.edge_at(a, b).map_or(0.0, |e| e.weight)
    }

    /// Tie proportion of `a → b`, or 0 when absent or undefined.
    ///
    /// An undefined `pij` only arises on edges leaving a node whose ties all
    /// weigh 0; such a node invests nothing, so its proportions read as 0.
    #[must_use]
    pub fn pij(&self, a: NodeIndex, b: NodeIndex) -> f64 {
        self.edge_at(a, b).and_then(|e| e.pij).unwrap_or(0.0)
    }

    /// Successor set of `idx`.
    #[must_use]
    pub fn successors_of(&self, idx: NodeIndex) -> &FixedBitSet {
        &self.successors[idx.index()]
    }

    /// Successors of `idx` in ascending index order.
    pub fn successor_indices(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.successors[idx.index()].ones().map(NodeIndex::new)
    }

    /// `successors(i) ∩ successors(j)`.
    #[must_use]
    pub fn shared_alters(&self, i: NodeIndex, j: NodeIndex) -> FixedBitSet {
        let mut shared = self.successors[i.index()].clone();
        shared.intersect_with(&self.successors[j.index()]);
        shared
    }

    /// Concentration weight of `idx`.
    ///
    /// # Errors
    ///
    /// Returns [`DecompError::MissingAttribute`] if the node has no `conc`.
    pub fn conc(&self, idx: NodeIndex) -> Result<f64, DecompError> {
        let node = &self.graph[idx];
        node.conc
            .ok_or_else(|| DecompError::missing(node.label.clone(), "conc"))
    }

    /// `true` when every edge has its reciprocal.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.graph
            .edge_references()
            .all(|e| self.graph.find_edge(e.target(), e.source()).is_some())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build::NodeAttrs;

    fn make_input(edges: &[(&str, &str, f64)]) -> InputGraph {
        let mut g = InputGraph::new();
        let all_ids: std::collections::BTreeSet<&str> =
            edges.iter().flat_map(|(a, b, _)| [*a, *b]).collect();
        for id in all_ids {
            g.add_node(id, NodeAttrs::unit()).unwrap();
        }
        for (a, b, w) in edges {
            g.add_edge(a, b, *w).unwrap();
        }
        g
    }

    #[test]
    fn one_way_edge_gets_zero_weight_reciprocal() {
        let sg = SymmetrizedGraph::from_input(make_input(&[("A", "B", 1.0)]));
        assert_eq!(sg.edge_count(), 2);
        assert_eq!(sg.reciprocals_added, 1);

        let back = sg.edge("B", "A").expect("reciprocal inserted");
        assert!(back.weight.abs() < f64::EPSILON);
        assert!(back.reciprocal);
        assert!(!sg.edge("A", "B").unwrap().reciprocal);
    }

    #[test]
    fn reciprocated_edges_are_left_alone() {
        let sg = SymmetrizedGraph::from_input(make_input(&[("A", "B", 1.0), ("B", "A", 3.0)]));
        assert_eq!(sg.edge_count(), 2);
        assert_eq!(sg.reciprocals_added, 0);
        assert!((sg.edge("B", "A").unwrap().weight - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn volumes_sum_out_and_in_weights() {
        // A → B (2), B → A (1), A → C (4)
        let sg = SymmetrizedGraph::from_input(make_input(&[
            ("A", "B", 2.0),
            ("B", "A", 1.0),
            ("A", "C", 4.0),
        ]));
        let a = sg.node("A").unwrap();
        assert!((a.output - 6.0).abs() < 1e-12);
        assert!((a.input - 1.0).abs() < 1e-12);

        let c = sg.node("C").unwrap();
        assert!(c.output.abs() < 1e-12, "C only has the zero reciprocal");
        assert!((c.input - 4.0).abs() < 1e-12);
    }

    #[test]
    fn successor_bitsets_match_edges() {
        let sg = SymmetrizedGraph::from_input(make_input(&[("A", "B", 1.0), ("B", "C", 1.0)]));
        let b = sg.node_index("B").unwrap();
        let succ: Vec<NodeIndex> = sg.successor_indices(b).collect();
        assert_eq!(
            succ,
            vec![sg.node_index("A").unwrap(), sg.node_index("C").unwrap()]
        );
        assert!(sg.is_symmetric());
    }

    #[test]
    fn shared_alters_is_intersection() {
        let sg = SymmetrizedGraph::from_input(make_input(&[
            ("A", "B", 1.0),
            ("A", "C", 1.0),
            ("B", "C", 1.0),
            ("C", "D", 1.0),
        ]));
        let a = sg.node_index("A").unwrap();
        let b = sg.node_index("B").unwrap();
        let shared: Vec<usize> = sg.shared_alters(a, b).ones().collect();
        assert_eq!(shared, vec![sg.node_index("C").unwrap().index()]);
    }

    #[test]
    fn isolated_node_has_empty_successors() {
        let mut input = make_input(&[("A", "B", 1.0)]);
        input.add_node("Z", NodeAttrs::unit()).unwrap();
        let sg = SymmetrizedGraph::from_input(input);
        let z = sg.node_index("Z").unwrap();
        assert_eq!(sg.successors_of(z).count_ones(..), 0);
    }

    #[test]
    fn missing_conc_reported_with_label() {
        let mut input = InputGraph::new();
        input.add_edge("A", "B", 1.0).unwrap();
        let sg = SymmetrizedGraph::from_input(input);
        let b = sg.node_index("B").unwrap();
        assert_eq!(sg.conc(b), Err(DecompError::missing("B", "conc")));
    }

    #[test]
    fn require_node_reports_unknown_labels() {
        let sg = SymmetrizedGraph::from_input(make_input(&[("A", "B", 1.0)]));
        assert_eq!(sg.require_node("A").unwrap().label, "A");
        assert_eq!(
            sg.require_node("Q"),
            Err(DecompError::UnknownNode("Q".to_string()))
        );
    }

    #[test]
    fn pij_defaults_to_zero_before_direct_stage() {
        let sg = SymmetrizedGraph::from_input(make_input(&[("A", "B", 1.0)]));
        let a = sg.node_index("A").unwrap();
        let b = sg.node_index("B").unwrap();
        assert!(sg.pij(a, b).abs() < f64::EPSILON);
    }
}
