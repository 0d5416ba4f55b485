//! Graph model for constraint decomposition.
//!
//! # Overview
//!
//! This module turns caller input into the normalized, state-carrying graph
//! every decomposition stage works on.
//!
//! ## Pipeline
//!
//! ```text
//! JSON node-link document
//!        ↓  document::GraphDocument::into_input_graph()
//! InputGraph (labelled nodes, possibly asymmetric weighted edges)
//!        ↓  normalize::SymmetrizedGraph::from_input()
//! SymmetrizedGraph
//!   ├─ graph:      DiGraph<NodeState, EdgeState>, reciprocal edges present
//!   └─ successors: per-node successor bitsets
//!        ↓  stats::GraphStats::from_symmetrized()
//! GraphStats (density, isolates, components, …)
//! ```
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use constraint_core::graph::{InputGraph, NodeAttrs, SymmetrizedGraph, GraphStats};
//!
//! let mut g = InputGraph::new();
//! g.add_node("A", NodeAttrs::unit())?;
//! g.add_node("B", NodeAttrs::unit())?;
//! g.add_edge("A", "B", 1.0)?;
//! let sg = SymmetrizedGraph::from_input(g);
//! let stats = GraphStats::from_symmetrized(&sg);
//! assert_eq!(stats.reciprocals_added, 1);
//! ```

pub mod build;
pub mod document;
pub mod normalize;
pub mod state;
pub mod stats;

// Re-export primary types at module level for convenience.
pub use build::{InputGraph, InputNode, NodeAttrs};
pub use document::GraphDocument;
pub use normalize::SymmetrizedGraph;
pub use state::{EdgeState, NodeState};
pub use stats::GraphStats;
