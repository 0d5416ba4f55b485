//! Dyadic stage: tie proportions and direct dependence.
//!
//! For each node `i` with total activity `T_i = output_i + input_i > 0`:
//!
//! ```text
//! pij(i,j) = (w(i,j) + w(j,i)) / T_i        for every successor j
//! DD_i     = Σ_j pij(i,j)² · conc_j
//! ```
//!
//! `DD` splits into a pure size part and a pure heterogeneity part:
//! `sizeEffect = 1/max(degree,1)` and `varEffect = varTS · degree`, where
//! `varTS` is the population variance of the node's tie proportions. Because
//! the proportions of a non-isolate sum to one, `DD = sizeEffect + varEffect`
//! exactly when every `conc` is 1 and the policy is not `equal`.
//!
//! Nodes without successors are isolates. A node with successors but
//! `T_i = 0` (every tie weighs 0) has undefined proportions: none are written
//! for its edges, they count as 0 downstream, and its dyadic terms stay zero.

use petgraph::graph::NodeIndex;
use tracing::{debug, instrument};

use crate::config::TieStrengthMethod;
use crate::error::DecompError;
use crate::graph::normalize::SymmetrizedGraph;

/// Run the dyadic stage over every node.
///
/// # Errors
///
/// Returns [`DecompError::MissingAttribute`] if a successor has no `conc`.
#[instrument(skip(sg), fields(nodes = sg.node_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn compute_direct_ties(
    sg: &mut SymmetrizedGraph,
    method: TieStrengthMethod,
) -> Result<(), DecompError> {
    let nodes: Vec<NodeIndex> = sg.graph.node_indices().collect();
    let mut isolates = 0usize;
    let mut inactive = 0usize;

    for i in nodes {
        let total = sg.graph[i].total_activity();
        let alters: Vec<NodeIndex> = sg.successor_indices(i).collect();
        let degree = alters.len();
        let isolate = degree == 0;

        let mut dd = 0.0;
        let mut ties = Vec::with_capacity(degree);

        if isolate {
            isolates += 1;
        } else if total <= 0.0 {
            inactive += 1;
            for j in alters {
                sg.conc(j)?;
            }
        } else {
            for j in alters {
                let p = (sg.weight(i, j) + sg.weight(j, i)) / total;
                dd += p * p * sg.conc(j)?;
                ties.push(p);
                if let Some(e) = sg.graph.find_edge(i, j) {
                    sg.graph[e].pij = Some(p);
                }
            }
        }

        let (var_ts, sq_avg_ts) = tie_moments(&ties, method);

        let node = &mut sg.graph[i];
        node.degree = degree;
        node.isolate = isolate;
        node.dd = dd;
        node.var_ts = var_ts;
        node.sq_avg_ts = sq_avg_ts;
        node.size_effect = 1.0 / degree.max(1) as f64;
        node.var_effect = var_ts * degree as f64;
    }

    debug!(isolates, inactive, %method, "dyadic stage complete");
    Ok(())
}

/// `(varTS, sqAvgTS)` for a node's tie proportions.
///
/// Both are zero for fewer than two ties; `varTS` is also zero under the
/// `equal` policy.
#[must_use]
pub fn tie_moments(ties: &[f64], method: TieStrengthMethod) -> (f64, f64) {
    if ties.len() < 2 {
        return (0.0, 0.0);
    }
    let mean = mean(ties);
    let var = if method.suppresses_variance() {
        0.0
    } else {
        population_variance(ties, mean)
    };
    (var, mean * mean)
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Variance with divisor `n`.
#[allow(clippy::cast_precision_loss)]
fn population_variance(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
