//! Input graph construction.
//!
//! # Overview
//!
//! [`InputGraph`] is the caller-facing graph: labelled nodes with optional
//! externally supplied attributes (`conc`, `betweenness`, `clustering`) and
//! weighted directed edges. It is what graph generators or document loaders
//! hand to [`crate::decomp::decompose`].
//!
//! ## Node Order
//!
//! Every node receives a petgraph [`NodeIndex`] in insertion order. That
//! index is the **total order** used by the quadriad deduplication rule
//! (`k > q`) everywhere in the crate. It is fixed when the node is added and
//! never recomputed, so the same input always deduplicates the same way.
//!
//! ## Edge Semantics
//!
//! - Weights must be finite and non-negative.
//! - Re-adding an existing directed edge overwrites its weight.
//! - Undirected edges insert both directions with the same weight.
//! - Self-loops carry no relational meaning for constraint and are dropped.
//!
//! ## Content Hash
//!
//! [`InputGraph::content_hash`] is a BLAKE3 hash of the sorted weighted edge
//! list, useful for tagging results with the graph they came from.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::warn;

use crate::config::TieStrengthMethod;
use crate::error::DecompError;

// ---------------------------------------------------------------------------
// Node attributes
// ---------------------------------------------------------------------------

/// Externally supplied per-node attributes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeAttrs {
    /// Alter concentration weight. Required for any node reached by the
    /// decomposition.
    pub conc: Option<f64>,
    pub betweenness: Option<f64>,
    pub clustering: Option<f64>,
}

impl NodeAttrs {
    /// Attributes with `conc = 1.0`, the neutral concentration weight.
    #[must_use]
    pub const fn unit() -> Self {
        Self {
            conc: Some(1.0),
            betweenness: None,
            clustering: None,
        }
    }

    #[must_use]
    pub const fn with_conc(mut self, conc: f64) -> Self {
        self.conc = Some(conc);
        self
    }

    #[must_use]
    pub const fn with_centrality(mut self, betweenness: f64, clustering: f64) -> Self {
        self.betweenness = Some(betweenness);
        self.clustering = Some(clustering);
        self
    }
}

/// A labelled node of the input graph.
#[derive(Debug, Clone, PartialEq)]
pub struct InputNode {
    pub label: String,
    pub attrs: NodeAttrs,
}

// ---------------------------------------------------------------------------
// InputGraph
// ---------------------------------------------------------------------------

/// A weighted directed graph awaiting decomposition.
#[derive(Debug, Clone, Default)]
pub struct InputGraph {
    /// Directed graph: node weights are labelled nodes, edge weights are tie weights.
    pub graph: DiGraph<InputNode, f64>,
    /// Mapping from label to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// Tie-strength policy declared by the graph's producer, if any.
    pub tie_strength: Option<TieStrengthMethod>,
    /// Graph-level configuration echo, carried through to the output verbatim.
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl InputGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_tie_strength(mut self, method: TieStrengthMethod) -> Self {
        self.tie_strength = Some(method);
        self
    }

    /// Record a graph-level configuration value to echo in the output.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Add a node with the given attributes.
    ///
    /// # Errors
    ///
    /// - [`DecompError::DuplicateNode`] if `label` is already present.
    /// - [`DecompError::InvalidAttribute`] if any supplied value is not finite.
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        attrs: NodeAttrs,
    ) -> Result<NodeIndex, DecompError> {
        let label = label.into();
        if self.node_map.contains_key(&label) {
            return Err(DecompError::DuplicateNode(label));
        }
        validate_attr(&label, "conc", attrs.conc)?;
        validate_attr(&label, "betweenness", attrs.betweenness)?;
        validate_attr(&label, "clustering", attrs.clustering)?;

        let idx = self.graph.add_node(InputNode {
            label: label.clone(),
            attrs,
        });
        self.node_map.insert(label, idx);
        Ok(idx)
    }

    /// Return the index for `label`, adding an attribute-less node if absent.
    pub fn ensure_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(label) {
            return idx;
        }
        let idx = self.graph.add_node(InputNode {
            label: label.to_string(),
            attrs: NodeAttrs::default(),
        });
        self.node_map.insert(label.to_string(), idx);
        idx
    }

    /// Add (or overwrite) the directed edge `ego → alter`.
    ///
    /// Unknown endpoints are created without attributes. Self-loops are
    /// dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`DecompError::InvalidWeight`] if `weight` is negative or not finite.
    pub fn add_edge(&mut self, ego: &str, alter: &str, weight: f64) -> Result<(), DecompError> {
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(DecompError::InvalidWeight {
                ego: ego.to_string(),
                alter: alter.to_string(),
                weight,
            });
        }
        if ego == alter {
            warn!(node = ego, "dropping self-loop");
            return Ok(());
        }

        let a = self.ensure_node(ego);
        let b = self.ensure_node(alter);
        self.graph.update_edge(a, b, weight);
        Ok(())
    }

    /// Add `a → b` and `b → a` with the same weight.
    ///
    /// # Errors
    ///
    /// Same as [`InputGraph::add_edge`].
    pub fn add_undirected_edge(&mut self, a: &str, b: &str, weight: f64) -> Result<(), DecompError> {
        self.add_edge(a, b, weight)?;
        self.add_edge(b, a, weight)
    }

    /// Set `conc` on every node that lacks it. Returns how many were filled.
    ///
    /// This is an explicit opt-in; the decomposition itself never defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DecompError::InvalidAttribute`] if `value` is not finite.
    pub fn fill_missing_conc(&mut self, value: f64) -> Result<usize, DecompError> {
        validate_attr("<default>", "conc", Some(value))?;
        let mut filled = 0;
        for node in self.graph.node_weights_mut() {
            if node.attrs.conc.is_none() {
                node.attrs.conc = Some(value);
                filled += 1;
            }
        }
        Ok(filled)
    }

    /// Return the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of directed edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for a label.
    #[must_use]
    pub fn node_index(&self, label: &str) -> Option<NodeIndex> {
        self.node_map.get(label).copied()
    }

    /// Return the weight of `ego → alter`, if that edge exists.
    #[must_use]
    pub fn weight(&self, ego: &str, alter: &str) -> Option<f64> {
        let a = self.node_index(ego)?;
        let b = self.node_index(alter)?;
        let e = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(e).copied()
    }

    /// BLAKE3 hash of the sorted weighted edge list.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut edges: Vec<(&str, &str, u64)> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].label.as_str(),
                    self.graph[e.target()].label.as_str(),
                    e.weight().to_bits(),
                )
            })
            .collect();
        edges.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        for (ego, alter, bits) in edges {
            hasher.update(ego.as_bytes());
            hasher.update(b"\x00");
            hasher.update(alter.as_bytes());
            hasher.update(b"\x00");
            hasher.update(&bits.to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize())
    }
}

fn validate_attr(node: &str, attribute: &'static str, value: Option<f64>) -> Result<(), DecompError> {
    match value {
        Some(v) if !v.is_finite() => Err(DecompError::InvalidAttribute {
            node: node.to_string(),
            attribute,
            value: v,
        }),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph() {
        let g = InputGraph::new();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.content_hash().starts_with("blake3:"));
    }

    #[test]
    fn insertion_order_defines_node_index() {
        let mut g = InputGraph::new();
        let z = g.add_node("z", NodeAttrs::unit()).unwrap();
        let a = g.add_node("a", NodeAttrs::unit()).unwrap();
        // Labels sort the other way; the index order is insertion order.
        assert!(z < a);
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut g = InputGraph::new();
        g.add_node("a", NodeAttrs::unit()).unwrap();
        assert_eq!(
            g.add_node("a", NodeAttrs::unit()),
            Err(DecompError::DuplicateNode("a".to_string()))
        );
    }

    #[test]
    fn non_finite_attribute_rejected() {
        let mut g = InputGraph::new();
        let err = g.add_node("a", NodeAttrs::unit().with_conc(f64::NAN));
        assert!(matches!(err, Err(DecompError::InvalidAttribute { attribute: "conc", .. })));
    }

    #[test]
    fn edge_creates_bare_endpoints() {
        let mut g = InputGraph::new();
        g.add_edge("a", "b", 2.0).unwrap();
        assert_eq!(g.node_count(), 2);
        let b = g.node_index("b").unwrap();
        assert_eq!(g.graph[b].attrs, NodeAttrs::default());
    }

    #[test]
    fn negative_and_nan_weights_rejected() {
        let mut g = InputGraph::new();
        assert!(matches!(
            g.add_edge("a", "b", -0.5),
            Err(DecompError::InvalidWeight { .. })
        ));
        assert!(matches!(
            g.add_edge("a", "b", f64::INFINITY),
            Err(DecompError::InvalidWeight { .. })
        ));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn readding_edge_overwrites_weight() {
        let mut g = InputGraph::new();
        g.add_edge("a", "b", 1.0).unwrap();
        g.add_edge("a", "b", 4.0).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.weight("a", "b"), Some(4.0));
    }

    #[test]
    fn self_loop_dropped() {
        let mut g = InputGraph::new();
        g.add_edge("a", "a", 1.0).unwrap();
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn undirected_edge_inserts_both_directions() {
        let mut g = InputGraph::new();
        g.add_undirected_edge("a", "b", 3.0).unwrap();
        assert_eq!(g.weight("a", "b"), Some(3.0));
        assert_eq!(g.weight("b", "a"), Some(3.0));
    }

    #[test]
    fn fill_missing_conc_only_touches_absent_values() {
        let mut g = InputGraph::new();
        g.add_node("a", NodeAttrs::unit().with_conc(2.0)).unwrap();
        g.add_edge("a", "b", 1.0).unwrap();
        assert_eq!(g.fill_missing_conc(1.0).unwrap(), 1);
        let a = g.node_index("a").unwrap();
        let b = g.node_index("b").unwrap();
        assert_eq!(g.graph[a].attrs.conc, Some(2.0));
        assert_eq!(g.graph[b].attrs.conc, Some(1.0));
    }

    #[test]
    fn content_hash_changes_with_weights() {
        let mut g = InputGraph::new();
        g.add_edge("a", "b", 1.0).unwrap();
        let before = g.content_hash();
        g.add_edge("a", "b", 2.0).unwrap();
        assert_ne!(before, g.content_hash(), "hash must change when weights change");
    }

    #[test]
    fn content_hash_ignores_insertion_order() {
        let mut g1 = InputGraph::new();
        g1.add_edge("a", "b", 1.0).unwrap();
        g1.add_edge("b", "c", 1.0).unwrap();

        let mut g2 = InputGraph::new();
        g2.add_edge("b", "c", 1.0).unwrap();
        g2.add_edge("a", "b", 1.0).unwrap();

        assert_eq!(g1.content_hash(), g2.content_hash());
    }
}
