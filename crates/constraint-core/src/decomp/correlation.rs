//! Correlation stage: net-of-effect columns and the published correlation set.
//!
//! # Overview
//!
//! Every node contributes one row to a fixed 15-column [`MetricTable`]. The
//! pairwise Pearson correlations of those columns form a [`CorrelationMatrix`];
//! a closed, ordered subset of 72 entries is published as [`Correlations`]:
//!
//! 1. All 66 upper-triangular pairs of the 12 [`Metric::PUBLISHED`] metrics,
//!    in row-major order (`Ci_DD`, `Ci_sizeEffect`, …, `clustering_degree`).
//! 2. `betweenness` and `clustering` against each of the three net columns
//!    (`betweenness_C_net_size`, …, `clustering_C_net_DD`).
//!
//! IR and CC are published under their quadriad names, `OQD` and `CQD`.
//!
//! # Degenerate Columns
//!
//! A column whose spread is within rounding of zero has no defined
//! correlation. Every pair involving it reports 0.0, as does every pair when
//! the graph has fewer than two nodes.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, instrument};

use crate::error::DecompError;
use crate::graph::normalize::SymmetrizedGraph;
use crate::graph::state::NodeState;

/// Relative spread below which a column counts as constant.
const SPREAD_EPSILON: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// A column of the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Ci,
    Dd,
    SizeEffect,
    VarEffect,
    Id,
    Tb,
    Qs,
    Ir,
    Cc,
    Betweenness,
    Clustering,
    Degree,
    CNetSize,
    CNetVar,
    CNetDd,
}

impl Metric {
    pub const COUNT: usize = 15;

    /// Every column in matrix order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Ci,
        Self::Dd,
        Self::SizeEffect,
        Self::VarEffect,
        Self::Id,
        Self::Tb,
        Self::Qs,
        Self::Ir,
        Self::Cc,
        Self::Betweenness,
        Self::Clustering,
        Self::Degree,
        Self::CNetSize,
        Self::CNetVar,
        Self::CNetDd,
    ];

    /// Metrics whose full upper triangle is published.
    pub const PUBLISHED: [Self; 12] = [
        Self::Ci,
        Self::Dd,
        Self::SizeEffect,
        Self::VarEffect,
        Self::Id,
        Self::Tb,
        Self::Qs,
        Self::Ir,
        Self::Cc,
        Self::Betweenness,
        Self::Clustering,
        Self::Degree,
    ];

    /// Constraint net of one of its explanatory parts.
    pub const NET: [Self; 3] = [Self::CNetSize, Self::CNetVar, Self::CNetDd];

    /// Column position in the matrix.
    #[must_use]
    pub const fn column(self) -> usize {
        self as usize
    }

    /// Node attribute name.
    #[must_use]
    pub const fn attribute_name(self) -> &'static str {
        match self {
            Self::Ci => "Ci",
            Self::Dd => "DD",
            Self::SizeEffect => "sizeEffect",
            Self::VarEffect => "varEffect",
            Self::Id => "ID",
            Self::Tb => "TB",
            Self::Qs => "QS",
            Self::Ir => "IR",
            Self::Cc => "CC",
            Self::Betweenness => "betweenness",
            Self::Clustering => "clustering",
            Self::Degree => "degree",
            Self::CNetSize => "C_net_size",
            Self::CNetVar => "C_net_var",
            Self::CNetDd => "C_net_DD",
        }
    }

    /// Name used in published correlation keys.
    #[must_use]
    pub const fn published_name(self) -> &'static str {
        match self {
            Self::Ir => "OQD",
            Self::Cc => "CQD",
            other => other.attribute_name(),
        }
    }

    /// Read this metric from a node.
    ///
    /// # Errors
    ///
    /// Returns [`DecompError::MissingAttribute`] for absent centrality values.
    #[allow(clippy::cast_precision_loss)]
    pub fn value(self, node: &NodeState) -> Result<f64, DecompError> {
        Ok(match self {
            Self::Ci => node.ci,
            Self::Dd => node.dd,
            Self::SizeEffect => node.size_effect,
            Self::VarEffect => node.var_effect,
            Self::Id => node.id,
            Self::Tb => node.tb,
            Self::Qs => node.qs,
            Self::Ir => node.ir,
            Self::Cc => node.cc,
            Self::Betweenness => node
                .betweenness
                .ok_or_else(|| DecompError::missing(node.label.clone(), "betweenness"))?,
            Self::Clustering => node
                .clustering
                .ok_or_else(|| DecompError::missing(node.label.clone(), "clustering"))?,
            Self::Degree => node.degree as f64,
            Self::CNetSize => node.c_net_size,
            Self::CNetVar => node.c_net_var,
            Self::CNetDd => node.c_net_dd,
        })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

// ---------------------------------------------------------------------------
// MetricTable
// ---------------------------------------------------------------------------

/// Dense column-major node × metric table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    rows: usize,
    data: Vec<f64>,
}

impl MetricTable {
    /// One row per node, in node-index order.
    ///
    /// # Errors
    ///
    /// Returns [`DecompError::MissingAttribute`] if any node lacks
    /// `betweenness` or `clustering`.
    pub fn from_graph(sg: &SymmetrizedGraph) -> Result<Self, DecompError> {
        let rows = sg.node_count();
        let mut data = vec![0.0; rows * Metric::COUNT];
        for (row, node) in sg.graph.node_weights().enumerate() {
            for metric in Metric::ALL {
                data[metric.column() * rows + row] = metric.value(node)?;
            }
        }
        Ok(Self { rows, data })
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn column(&self, metric: Metric) -> &[f64] {
        let start = metric.column() * self.rows;
        &self.data[start..start + self.rows]
    }
}

// ---------------------------------------------------------------------------
// Pearson
// ---------------------------------------------------------------------------

/// `true` when `values` has fewer than two entries or no meaningful spread.
#[must_use]
pub fn is_degenerate(values: &[f64]) -> bool {
    if values.len() < 2 {
        return true;
    }
    let (min, max, mag) = values.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, 0.0f64),
        |(lo, hi, mag), &v| (lo.min(v), hi.max(v), mag.max(v.abs())),
    );
    max - min <= SPREAD_EPSILON * mag.max(1.0)
}

/// Pearson correlation of two equal-length samples.
///
/// Returns 0.0 when either sample is degenerate. The result is clamped to
/// `[-1, 1]` and is exactly symmetric in its arguments.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    if is_degenerate(x) || is_degenerate(y) {
        return 0.0;
    }
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = var_x.sqrt() * var_y.sqrt();
    if denom <= 0.0 {
        return 0.0;
    }
    (cov / denom).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// CorrelationMatrix
// ---------------------------------------------------------------------------

/// Symmetric 15 × 15 Pearson matrix over [`Metric::ALL`].
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    values: [[f64; Metric::COUNT]; Metric::COUNT],
}

impl CorrelationMatrix {
    /// Compute every pair once and mirror it.
    #[must_use]
    pub fn from_table(table: &MetricTable) -> Self {
        let mut values = [[0.0; Metric::COUNT]; Metric::COUNT];
        for (ai, a) in Metric::ALL.iter().enumerate() {
            let xa = table.column(*a);
            values[ai][ai] = if is_degenerate(xa) { 0.0 } else { 1.0 };
            for (bi, b) in Metric::ALL.iter().enumerate().skip(ai + 1) {
                let r = pearson(xa, table.column(*b));
                values[ai][bi] = r;
                values[bi][ai] = r;
            }
        }
        Self { values }
    }

    #[must_use]
    pub const fn get(&self, a: Metric, b: Metric) -> f64 {
        self.values[a.column()][b.column()]
    }
}

// ---------------------------------------------------------------------------
// Published correlations
// ---------------------------------------------------------------------------

/// Number of published correlation scalars.
pub const PUBLISHED_COUNT: usize = 72;

/// The published pairs, in publication order.
#[must_use]
pub fn published_pairs() -> Vec<(Metric, Metric)> {
    let mut pairs = Vec::with_capacity(PUBLISHED_COUNT);
    for (ai, a) in Metric::PUBLISHED.iter().enumerate() {
        for b in &Metric::PUBLISHED[ai + 1..] {
            pairs.push((*a, *b));
        }
    }
    for a in [Metric::Betweenness, Metric::Clustering] {
        for b in Metric::NET {
            pairs.push((a, b));
        }
    }
    pairs
}

/// Published key for a pair, e.g. `Ci_OQD`.
#[must_use]
pub fn pair_name(a: Metric, b: Metric) -> String {
    format!("{}_{}", a.published_name(), b.published_name())
}

/// One published correlation scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationEntry {
    pub name: String,
    pub a: Metric,
    pub b: Metric,
    pub value: f64,
}

/// The ordered set of published correlation scalars.
///
/// Serializes as a JSON object whose keys keep publication order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Correlations {
    entries: Vec<CorrelationEntry>,
}

impl Correlations {
    /// Select the published pairs from a full matrix.
    #[must_use]
    pub fn from_matrix(matrix: &CorrelationMatrix) -> Self {
        let entries = published_pairs()
            .into_iter()
            .map(|(a, b)| CorrelationEntry {
                name: pair_name(a, b),
                a,
                b,
                value: matrix.get(a, b),
            })
            .collect();
        Self { entries }
    }

    /// Look up a scalar by its published name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorrelationEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Correlations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Stage entry point
// ---------------------------------------------------------------------------

/// Write the net columns onto every node and compute the published set.
///
/// # Errors
///
/// Returns [`DecompError::MissingAttribute`] if a node lacks centrality.
#[instrument(skip(sg), fields(nodes = sg.node_count()))]
pub fn compute_correlations(sg: &mut SymmetrizedGraph) -> Result<Correlations, DecompError> {
    for node in sg.graph.node_weights_mut() {
        node.c_net_size = node.ci - node.size_effect;
        node.c_net_var = node.ci - node.var_effect;
        node.c_net_dd = node.ci - node.dd;
    }

    let table = MetricTable::from_graph(sg)?;
    let degenerate: Vec<Metric> = Metric::ALL
        .into_iter()
        .filter(|m| is_degenerate(table.column(*m)))
        .collect();
    let matrix = CorrelationMatrix::from_table(&table);
    let correlations = Correlations::from_matrix(&matrix);

    debug!(
        rows = table.rows(),
        degenerate = ?degenerate,
        published = correlations.len(),
        "correlation stage complete"
    );
    Ok(correlations)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
