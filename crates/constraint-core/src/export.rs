//! Serializable records for a decomposed graph.
//!
//! Field names are the published attribute names (`DD`, `aggIndirect`,
//! `C_net_size`, …) so the JSON output reads like the node-link input with
//! the decomposition written onto it:
//!
//! ```json
//! { "directed": true,
//!   "graph": { "netType": "HZ", "tsMethod": "freq", "contentHash": "blake3:…",
//!              "stats": { … }, "Ci_DD": 0.93, … },
//!   "nodes": [ { "id": "A", "Ci": 1.12, "DD": 0.5, … } ],
//!   "links": [ { "source": "A", "target": "B", "pij": 0.5, "aggIndirect": 0.25, … } ] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::TieStrengthMethod;
use crate::decomp::{Correlations, DecomposedGraph};
use crate::graph::state::{EdgeState, NodeState};
use crate::graph::stats::GraphStats;

/// Per-node output record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct NodeRecord {
    pub id: String,
    pub conc: Option<f64>,
    pub output: f64,
    pub input: f64,
    pub degree: usize,
    pub DD: f64,
    pub TB: f64,
    pub ID: f64,
    pub IR: f64,
    pub CC: f64,
    pub QS: f64,
    pub Ci: f64,
    #[serde(rename = "varTS")]
    pub var_ts: f64,
    #[serde(rename = "sqAvgTS")]
    pub sq_avg_ts: f64,
    #[serde(rename = "sizeEffect")]
    pub size_effect: f64,
    #[serde(rename = "varEffect")]
    pub var_effect: f64,
    pub C_net_size: f64,
    pub C_net_var: f64,
    pub C_net_DD: f64,
    pub betweenness: Option<f64>,
    pub clustering: Option<f64>,
}

impl From<&NodeState> for NodeRecord {
    fn from(n: &NodeState) -> Self {
        Self {
            id: n.label.clone(),
            conc: n.conc,
            output: n.output,
            input: n.input,
            degree: n.degree,
            DD: n.dd,
            TB: n.tb,
            ID: n.id,
            IR: n.ir,
            CC: n.cc,
            QS: n.qs,
            Ci: n.ci,
            var_ts: n.var_ts,
            sq_avg_ts: n.sq_avg_ts,
            size_effect: n.size_effect,
            var_effect: n.var_effect,
            C_net_size: n.c_net_size,
            C_net_var: n.c_net_var,
            C_net_DD: n.c_net_dd,
            betweenness: n.betweenness,
            clustering: n.clustering,
        }
    }
}

/// Per-edge output record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub weight: f64,
    /// Absent when the source's ties all weigh 0.
    pub pij: Option<f64>,
    pub agg_indirect: f64,
    /// Zero-weight edge inserted to symmetrize existence.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reciprocal: bool,
}

impl EdgeRecord {
    fn new(source: &str, target: &str, e: &EdgeState) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            weight: e.weight,
            pij: e.pij,
            agg_indirect: e.agg_indirect,
            reciprocal: e.reciprocal,
        }
    }
}

/// Graph-level output record: the input's configuration echo plus results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphRecord {
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    pub ts_method: TieStrengthMethod,
    pub content_hash: String,
    pub stats: GraphStats,
    #[serde(flatten)]
    pub correlations: Correlations,
}

/// The full output document, in node-link form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedDocument {
    pub directed: bool,
    pub graph: GraphRecord,
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<EdgeRecord>,
}

impl EnrichedDocument {
    /// Build the document. Nodes keep node-index order; links are ordered
    /// by source then target index.
    #[must_use]
    pub fn from_decomposed(d: &DecomposedGraph) -> Self {
        let g = &d.graph.graph;
        let nodes = g.node_weights().map(NodeRecord::from).collect();

        let mut links = Vec::with_capacity(g.edge_count());
        for i in g.node_indices() {
            for j in d.graph.successor_indices(i) {
                if let Some(e) = d.graph.edge_at(i, j) {
                    links.push(EdgeRecord::new(&g[i].label, &g[j].label, e));
                }
            }
        }

        Self {
            directed: true,
            graph: GraphRecord {
                attributes: d.graph.attributes.clone(),
                ts_method: d.tie_strength,
                content_hash: d.graph.content_hash.clone(),
                stats: d.stats.clone(),
                correlations: d.correlations.clone(),
            },
            nodes,
            links,
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be represented in JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
