//! Owned per-node and per-edge state populated by the decomposition stages.
//!
//! Each stage of [`crate::decomp`] writes a disjoint subset of these fields;
//! later stages read what earlier stages wrote. Field names follow the
//! published attribute names through the serde records in [`crate::export`].

use crate::graph::build::InputNode;

/// Per-node inputs and decomposition outputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeState {
    pub label: String,

    // Externally supplied.
    pub conc: Option<f64>,
    pub betweenness: Option<f64>,
    pub clustering: Option<f64>,

    // Volumes (normalizer).
    pub output: f64,
    pub input: f64,

    // Dyadic stage.
    pub degree: usize,
    /// No successors: `Ci` is fixed at 1 and every component is 0.
    pub isolate: bool,
    pub dd: f64,
    pub var_ts: f64,
    pub sq_avg_ts: f64,
    pub size_effect: f64,
    pub var_effect: f64,

    // Triadic and quadriad stages.
    pub ci: f64,
    pub tb: f64,
    pub id: f64,
    pub ir: f64,
    pub cc: f64,
    pub qs: f64,

    // Correlation stage.
    pub c_net_size: f64,
    pub c_net_var: f64,
    pub c_net_dd: f64,
}

impl NodeState {
    #[must_use]
    pub fn from_input(node: &InputNode) -> Self {
        Self {
            label: node.label.clone(),
            conc: node.attrs.conc,
            betweenness: node.attrs.betweenness,
            clustering: node.attrs.clustering,
            ..Self::default()
        }
    }

    /// Total relational activity: `output + input`.
    #[must_use]
    pub fn total_activity(&self) -> f64 {
        self.output + self.input
    }

    /// `DD + TB + ID + IR + CC`.
    #[must_use]
    pub fn component_sum(&self) -> f64 {
        self.dd + self.tb + self.id + self.ir + self.cc
    }
}

/// Per-edge weight and derived tie quantities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeState {
    pub weight: f64,
    /// Share of the source's total activity invested in the target.
    /// `None` when the source's ties all weigh 0.
    pub pij: Option<f64>,
    /// Sum of two-hop path strengths through shared successors.
    pub agg_indirect: f64,
    /// Inserted by the normalizer as the zero-weight reciprocal of an
    /// asymmetric edge.
    pub reciprocal: bool,
}

impl EdgeState {
    #[must_use]
    pub const fn new(weight: f64, reciprocal: bool) -> Self {
        Self {
            weight,
            pij: None,
            agg_indirect: 0.0,
            reciprocal,
        }
    }
}
