//! JSON node-link documents.
//!
//! The document format is the node-link layout graph tooling commonly emits:
//!
//! ```json
//! { "directed": true,
//!   "graph": { "tsMethod": "freq", "netType": "HZ" },
//!   "nodes": [ { "id": "A", "conc": 1.0 } ],
//!   "links": [ { "source": "A", "target": "B", "weight": 1.0 } ] }
//! ```
//!
//! - `edges` is accepted in place of `links`.
//! - Node ids may be strings or integers; both become string labels. An id
//!   used in both forms (`1` and `"1"`) is rejected rather than merged.
//! - A link without `weight` gets weight 1.0.
//! - Links naming undeclared ids create attribute-less nodes.
//! - `graph.tsMethod` selects the tie-strength policy. Keys the output writes
//!   itself (`contentHash`, `stats`, published correlation names) are dropped,
//!   so an enriched document can be fed back in. Every other `graph` entry is
//!   echoed to the output untouched.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::TieStrengthMethod;
use crate::decomp::correlation::{pair_name, published_pairs};
use crate::error::DecompError;
use crate::graph::build::{InputGraph, NodeAttrs};

/// Graph-level key carrying the tie-strength policy.
pub const TIE_STRENGTH_KEY: &str = "tsMethod";

/// Graph-level keys written by the enriched output.
pub const OUTPUT_GRAPH_KEYS: [&str; 3] = [TIE_STRENGTH_KEY, "contentHash", "stats"];

/// A node id as it appears in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
    Int(i64),
    Str(String),
}

impl NodeId {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Str(s) => s.clone(),
        }
    }

    const fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }
}

/// Labels seen so far, with whether each arrived as an integer.
#[derive(Debug, Default)]
struct IdForms(HashMap<String, bool>);

impl IdForms {
    fn label(&mut self, id: &NodeId) -> Result<String, DecompError> {
        let label = id.label();
        match self.0.get(&label) {
            Some(&int) if int != id.is_int() => Err(DecompError::AmbiguousNodeId(label)),
            Some(_) => Ok(label),
            None => {
                self.0.insert(label.clone(), id.is_int());
                Ok(label)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conc: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub betweenness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clustering: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// A graph document in node-link form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default = "default_true")]
    pub directed: bool,
    #[serde(default)]
    pub graph: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
    #[serde(default, alias = "edges")]
    pub links: Vec<LinkEntry>,
}

impl GraphDocument {
    /// Read a document from a file path, or stdin when `path` is `-`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid document.
    pub fn from_path(path: &Path) -> Result<Self> {
        if path.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read graph document from stdin")?;
            return Self::parse(&buf).context("Failed to parse graph document from stdin");
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid JSON for [`GraphDocument`].
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Declared tie-strength policy, if the document has one.
    ///
    /// # Errors
    ///
    /// Returns [`DecompError::UnknownTieStrength`] if `tsMethod` is present
    /// but not a recognised method name.
    pub fn tie_strength(&self) -> Result<Option<TieStrengthMethod>, DecompError> {
        match self.graph.get(TIE_STRENGTH_KEY) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => s.parse().map(Some),
            Some(other) => Err(DecompError::UnknownTieStrength(other.to_string())),
        }
    }

    /// Convert into an [`InputGraph`].
    ///
    /// Declared nodes are inserted first, in document order, so their
    /// position in `nodes` fixes the deduplication order.
    ///
    /// # Errors
    ///
    /// - [`DecompError::AmbiguousNodeId`] if an id appears both as an
    ///   integer and as a string.
    /// - Node/edge validation errors from [`InputGraph`] and tie-strength
    ///   parse errors.
    pub fn into_input_graph(self) -> Result<InputGraph, DecompError> {
        let tie_strength = self.tie_strength()?;

        let mut g = InputGraph::new();
        g.tie_strength = tie_strength;

        let published: HashSet<String> = published_pairs()
            .into_iter()
            .map(|(a, b)| pair_name(a, b))
            .collect();
        for (key, value) in self.graph {
            if !OUTPUT_GRAPH_KEYS.contains(&key.as_str()) && !published.contains(&key) {
                g.set_attribute(key, value);
            }
        }

        let mut ids = IdForms::default();

        for node in self.nodes {
            let attrs = NodeAttrs {
                conc: node.conc,
                betweenness: node.betweenness,
                clustering: node.clustering,
            };
            g.add_node(ids.label(&node.id)?, attrs)?;
        }

        for link in self.links {
            let ego = ids.label(&link.source)?;
            let alter = ids.label(&link.target)?;
            if self.directed {
                g.add_edge(&ego, &alter, link.weight)?;
            } else {
                g.add_undirected_edge(&ego, &alter, link.weight)?;
            }
        }

        Ok(g)
    }
}

const fn default_true() -> bool {
    true
}

const fn default_weight() -> f64 {
    1.0
}
