//! Consistency checks over a decomposed graph.
//!
//! The main pass derives `CC` as a residual, so `Ci = DD + TB + ID + IR + CC`
//! holds by construction up to rounding. The checks here recompute the pieces
//! independently:
//!
//! - **Identity**: `Ci` against `DD + TB + ID + IR + CC_direct`, where
//!   `CC_direct` is accumulated from closed quadriads by
//!   [`direct_closure`].
//! - **Closure**: residual `CC` against `CC_direct`.
//! - **Redundancy**: incremental `IR` against
//!   [`brute_force_indirect_redundancy`].
//! - **Symmetry**: every edge has its reciprocal.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::decomp::DecomposedGraph;
use crate::decomp::quadriad::{brute_force_indirect_redundancy, direct_closure};
use crate::error::DecompError;
use crate::graph::normalize::SymmetrizedGraph;

/// Node count above which the brute-force IR check is skipped.
pub const BRUTE_FORCE_LIMIT: usize = 200;

/// Fail on the first node with successors whose identity residual exceeds
/// `tolerance`. Nodes whose ties all weigh 0 are checked like any other.
///
/// # Errors
///
/// - [`DecompError::IdentityViolation`] naming the offending node.
/// - [`DecompError::MissingAttribute`] if a successor lacks `conc`.
#[instrument(skip(sg), fields(nodes = sg.node_count()))]
pub fn check_identity(sg: &SymmetrizedGraph, tolerance: f64) -> Result<(), DecompError> {
    for i in sg.graph.node_indices() {
        let node = &sg.graph[i];
        if node.isolate {
            continue;
        }
        let cc_direct = direct_closure(sg, i)?;
        let residual = node.ci - (node.dd + node.tb + node.id + node.ir + cc_direct);
        if residual.abs() > tolerance {
            return Err(DecompError::IdentityViolation {
                node: node.label.clone(),
                residual,
            });
        }
    }
    debug!("identity holds for every node");
    Ok(())
}

/// Outcome of [`verify`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub tolerance: f64,
    pub symmetric: bool,
    /// Largest `|Ci − (DD + TB + ID + IR + CC_direct)|` over nodes with
    /// successors, and `|Ci − 1|` over isolates.
    pub max_identity_residual: f64,
    /// Largest `|CC − CC_direct|`.
    pub max_closure_diff: f64,
    /// Largest `|IR − IR_brute|`; `None` when the graph exceeds
    /// [`BRUTE_FORCE_LIMIT`].
    pub max_redundancy_diff: Option<f64>,
    /// Labels of nodes failing any numeric check.
    pub failing_nodes: Vec<String>,
}

impl VerificationReport {
    /// `true` when every check that ran passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.symmetric && self.failing_nodes.is_empty()
    }
}

/// Run every check against `decomposed`.
///
/// # Errors
///
/// Returns [`DecompError::MissingAttribute`] if a successor lacks `conc`.
#[instrument(skip(decomposed))]
pub fn verify(decomposed: &DecomposedGraph, tolerance: f64) -> Result<VerificationReport, DecompError> {
    let sg = &decomposed.graph;
    let brute = sg.node_count() <= BRUTE_FORCE_LIMIT;

    let mut report = VerificationReport {
        tolerance,
        symmetric: sg.is_symmetric(),
        max_identity_residual: 0.0,
        max_closure_diff: 0.0,
        max_redundancy_diff: brute.then_some(0.0),
        failing_nodes: Vec::new(),
    };

    for i in sg.graph.node_indices() {
        let node = &sg.graph[i];
        let cc_direct = direct_closure(sg, i)?;
        let identity = if node.isolate {
            (node.ci - 1.0).abs()
        } else {
            (node.ci - (node.dd + node.tb + node.id + node.ir + cc_direct)).abs()
        };
        let closure = (node.cc - cc_direct).abs();
        let redundancy = if brute {
            (node.ir - brute_force_indirect_redundancy(sg, i)?).abs()
        } else {
            0.0
        };

        report.max_identity_residual = report.max_identity_residual.max(identity);
        report.max_closure_diff = report.max_closure_diff.max(closure);
        if let Some(max) = report.max_redundancy_diff.as_mut() {
            *max = max.max(redundancy);
        }
        if identity > tolerance || closure > tolerance || redundancy > tolerance {
            report.failing_nodes.push(node.label.clone());
        }
    }

    debug!(
        passed = report.passed(),
        failing = report.failing_nodes.len(),
        "verification complete"
    );
    Ok(report)
}
