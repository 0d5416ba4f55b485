//! The decomposition pipeline.
//!
//! # Overview
//!
//! [`decompose`] consumes an [`InputGraph`] and returns a [`DecomposedGraph`]
//! carrying every per-node and per-edge quantity plus the published
//! correlation set. The stages run strictly in order; each reads only what
//! earlier stages wrote:
//!
//! ```text
//! InputGraph
//!   ↓ SymmetrizedGraph::from_input     reciprocals, volumes, successor sets
//!   ↓ metrics::fill_missing_centrality (optional) betweenness, clustering
//!   ↓ direct::compute_direct_ties      pij, DD, varTS, sizeEffect, varEffect
//!   ↓ indirect::compute_indirect       aggIndirect, Ci, TB, ID, IR, CC, QS
//!   ↓ verify::check_identity           (optional) Ci vs directly summed parts
//!   ↓ correlation::compute_correlations C_net_*, 72 published scalars
//! DecomposedGraph
//! ```
//!
//! # Tie-strength Resolution
//!
//! The policy applied is the one declared on the input graph when present,
//! falling back to [`crate::config::DecompSection::tie_strength`].

pub mod correlation;
pub mod direct;
pub mod indirect;
pub mod quadriad;

use tracing::{info, instrument};

use crate::config::{DecompConfig, TieStrengthMethod};
use crate::error::DecompError;
use crate::graph::build::InputGraph;
use crate::graph::normalize::SymmetrizedGraph;
use crate::graph::stats::GraphStats;
use crate::metrics::fill_missing_centrality;
use crate::verify::check_identity;

pub use correlation::{Correlations, Metric};

/// A fully decomposed graph.
#[derive(Debug, Clone)]
pub struct DecomposedGraph {
    /// The symmetrized graph with every stage's output written in.
    pub graph: SymmetrizedGraph,
    /// The published correlation scalars.
    pub correlations: Correlations,
    /// Structural summary of the symmetrized graph.
    pub stats: GraphStats,
    /// Policy the dyadic stage ran under.
    pub tie_strength: TieStrengthMethod,
}

/// Run the full pipeline on `input`.
///
/// # Errors
///
/// - [`DecompError::MissingAttribute`] when a reached node lacks `conc`, or
///   lacks centrality with fill-in disabled.
/// - [`DecompError::IdentityViolation`] when identity verification is on and
///   a node's residual exceeds the configured tolerance.
#[instrument(skip_all, fields(nodes = input.node_count(), edges = input.edge_count()))]
pub fn decompose(input: InputGraph, config: &DecompConfig) -> Result<DecomposedGraph, DecompError> {
    let tie_strength = input.tie_strength.unwrap_or(config.decomp.tie_strength);
    let mut sg = SymmetrizedGraph::from_input(input);

    let filled = if config.centrality.fill_missing {
        fill_missing_centrality(&mut sg)
    } else {
        0
    };

    direct::compute_direct_ties(&mut sg, tie_strength)?;
    indirect::compute_indirect(&mut sg)?;

    if config.decomp.verify_identity {
        check_identity(&sg, config.decomp.identity_tolerance)?;
    }

    let correlations = correlation::compute_correlations(&mut sg)?;
    let stats = GraphStats::from_symmetrized(&sg);

    info!(
        nodes = stats.node_count,
        edges = stats.edge_count,
        reciprocals = stats.reciprocals_added,
        isolates = stats.isolate_count,
        centrality_filled = filled,
        %tie_strength,
        "decomposition complete"
    );

    Ok(DecomposedGraph {
        graph: sg,
        correlations,
        stats,
        tie_strength,
    })
}
