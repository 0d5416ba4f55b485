//! Known-topology regression tests for the decomposition.
//!
//! Each test uses a hand-crafted graph whose decomposition can be worked out
//! on paper. Expected values are hardcoded, so any change to the formulas or
//! to the traversal order that shifts them is caught here.

use constraint_core::config::{DecompConfig, TieStrengthMethod};
use constraint_core::decomp::{DecomposedGraph, decompose};
use constraint_core::graph::build::{InputGraph, NodeAttrs};
use constraint_core::graph::document::GraphDocument;
use constraint_core::verify::verify;

const EPS: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn directed(nodes: &[&str], edges: &[(&str, &str, f64)]) -> DecomposedGraph {
    let mut g = InputGraph::new();
    for id in nodes {
        g.add_node(*id, NodeAttrs::unit()).unwrap();
    }
    for (a, b, w) in edges {
        g.add_edge(a, b, *w).unwrap();
    }
    decompose(g, &DecompConfig::default()).unwrap()
}

fn undirected(nodes: &[&str], edges: &[(&str, &str)]) -> DecomposedGraph {
    let mut g = InputGraph::new();
    for id in nodes {
        g.add_node(*id, NodeAttrs::unit()).unwrap();
    }
    for (a, b) in edges {
        g.add_undirected_edge(a, b, 1.0).unwrap();
    }
    decompose(g, &DecompConfig::default()).unwrap()
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < EPS,
        "{what}: expected {expected}, got {actual}"
    );
}

// ---------------------------------------------------------------------------
// Two nodes, one directed edge
// ---------------------------------------------------------------------------

#[test]
fn dyad_with_one_directed_edge() {
    let d = directed(&["A", "B"], &[("A", "B", 1.0)]);
    let sg = &d.graph;

    let back = sg.edge("B", "A").expect("reciprocal inserted");
    assert_close(back.weight, 0.0, "w(B,A)");
    assert_eq!(sg.edge("A", "B").unwrap().pij, Some(1.0));
    assert_eq!(sg.edge("B", "A").unwrap().pij, Some(1.0));

    let a = sg.node("A").unwrap();
    assert_close(a.dd, 1.0, "DD_A");
    assert_close(a.ci, 1.0, "Ci_A");
    assert_close(a.tb, 0.0, "TB_A");
    assert_close(a.id, 0.0, "ID_A");
    assert_close(a.ir, 0.0, "IR_A");
    assert_close(a.cc, 0.0, "CC_A");
}

// ---------------------------------------------------------------------------
// Three-node directed cycle
// ---------------------------------------------------------------------------

#[test]
fn directed_three_cycle() {
    let d = directed(
        &["A", "B", "C"],
        &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)],
    );
    let sg = &d.graph;
    assert_eq!(d.stats.reciprocals_added, 3);
    for (a, b) in [("B", "A"), ("C", "B"), ("A", "C")] {
        let e = sg.edge(a, b).unwrap();
        assert!(e.reciprocal, "{a}->{b} inserted");
        assert_close(e.weight, 0.0, "reciprocal weight");
    }

    for (ego, x, y) in [("A", "B", "C"), ("B", "C", "A"), ("C", "A", "B")] {
        let n = sg.node(ego).unwrap();
        assert_eq!(n.degree, 2);
        assert_eq!(sg.edge(ego, x).unwrap().pij, Some(0.5));
        assert_eq!(sg.edge(ego, y).unwrap().pij, Some(0.5));
        assert_close(sg.edge(ego, x).unwrap().agg_indirect, 0.25, "aggIndirect");
        assert_close(sg.edge(ego, y).unwrap().agg_indirect, 0.25, "aggIndirect");
        assert_close(n.dd, 0.5, "DD");
        assert_close(n.tb, 0.5, "TB");
        assert_close(n.id, 0.125, "ID");
        assert_close(n.ir, 0.0, "IR");
        assert_close(n.cc, 0.0, "CC");
        assert_close(n.ci, 1.125, "Ci");
    }
}

// ---------------------------------------------------------------------------
// Star
// ---------------------------------------------------------------------------

#[test]
fn star_hub_and_leaves() {
    let d = undirected(
        &["H", "L1", "L2", "L3", "L4"],
        &[("H", "L1"), ("H", "L2"), ("H", "L3"), ("H", "L4")],
    );
    let sg = &d.graph;

    let h = sg.node("H").unwrap();
    assert_eq!(h.degree, 4);
    assert_close(h.dd, 0.25, "DD_H");
    assert_close(h.ci, 0.25, "Ci_H");
    assert_close(h.size_effect, 0.25, "sizeEffect_H");
    assert_close(h.var_effect, 0.0, "varEffect_H");
    assert_close(h.betweenness.unwrap(), 1.0, "betweenness_H");
    assert_close(h.clustering.unwrap(), 0.0, "clustering_H");

    for leaf in ["L1", "L2", "L3", "L4"] {
        let n = sg.node(leaf).unwrap();
        assert_close(n.ci, 1.0, "Ci_leaf");
        assert_close(n.betweenness.unwrap(), 0.0, "betweenness_leaf");
    }

    // Ci and DD coincide everywhere; Ci falls as degree rises.
    assert_close(d.correlations.get("Ci_DD").unwrap(), 1.0, "Ci_DD");
    assert_close(d.correlations.get("Ci_degree").unwrap(), -1.0, "Ci_degree");
    // No triads: TB is flat, so every TB pair is zero.
    assert_close(d.correlations.get("Ci_TB").unwrap(), 0.0, "Ci_TB");
}

// ---------------------------------------------------------------------------
// Four-clique
// ---------------------------------------------------------------------------

#[test]
fn four_clique_is_pure_closure() {
    let d = undirected(
        &["A", "B", "C", "D"],
        &[
            ("A", "B"),
            ("A", "C"),
            ("A", "D"),
            ("B", "C"),
            ("B", "D"),
            ("C", "D"),
        ],
    );
    for n in d.graph.graph.node_weights() {
        assert_close(n.dd, 1.0 / 3.0, "DD");
        assert_close(n.tb, 4.0 / 9.0, "TB");
        assert_close(n.id, 2.0 / 27.0, "ID");
        assert_close(n.ir, 0.0, "IR");
        assert_close(n.cc, 2.0 / 27.0, "CC");
        assert_close(n.qs, 2.0 / 27.0, "QS");
        assert_close(n.ci, 25.0 / 27.0, "Ci");
        assert_close(n.clustering.unwrap(), 1.0, "clustering");
    }
    // Every column is constant across a vertex-transitive graph.
    assert!(d.correlations.iter().all(|c| c.value.abs() < EPS));
}

// ---------------------------------------------------------------------------
// Wheel: open quadriads around a hub
// ---------------------------------------------------------------------------

#[test]
fn hub_over_square_has_open_quadriads() {
    let d = undirected(
        &["A", "B", "C", "D", "H"],
        &[
            ("A", "B"),
            ("B", "C"),
            ("C", "D"),
            ("D", "A"),
            ("H", "A"),
            ("H", "B"),
            ("H", "C"),
            ("H", "D"),
        ],
    );
    let h = d.graph.node("H").unwrap();
    // pij(H,·) = 1/4 and pij(corner,·) = 1/3. For each corner j the shared
    // alters are its two square neighbours, which form one open pair:
    // 4 · 2 · (1/4)² · (1/3)² = 1/18.
    assert_close(h.ir, 1.0 / 18.0, "IR_H");
    assert_close(h.cc, 0.0, "CC_H");
    assert_close(h.qs, h.ir, "QS_H");
    assert!(verify(&d, 1e-9).unwrap().passed());
}

// ---------------------------------------------------------------------------
// Isolates and policy
// ---------------------------------------------------------------------------

#[test]
fn isolate_has_unit_constraint() {
    let d = directed(&["A", "B", "Z"], &[("A", "B", 1.0)]);
    let z = d.graph.node("Z").unwrap();
    assert_close(z.ci, 1.0, "Ci_Z");
    assert_close(z.component_sum(), 0.0, "components_Z");
    assert_eq!(d.stats.isolate_count, 1);
}

#[test]
fn zero_weight_ties_keep_identity() {
    let d = directed(&["A", "B", "C"], &[("A", "B", 0.0), ("B", "C", 1.0)]);
    let a = d.graph.node("A").unwrap();
    assert_eq!(a.degree, 1);
    assert_close(a.ci, 0.0, "Ci_A");
    assert_close(a.ci - a.component_sum(), 0.0, "identity_A");
    assert_eq!(d.stats.isolate_count, 0);

    let report = verify(&d, 1e-9).unwrap();
    assert!(report.passed(), "{report:?}");
}

#[test]
fn equal_policy_zeroes_variance_effect() {
    let mut g = InputGraph::new().with_tie_strength(TieStrengthMethod::Equal);
    for id in ["A", "B", "C"] {
        g.add_node(id, NodeAttrs::unit()).unwrap();
    }
    g.add_edge("A", "B", 5.0).unwrap();
    g.add_edge("A", "C", 1.0).unwrap();
    let d = decompose(g, &DecompConfig::default()).unwrap();
    for n in d.graph.graph.node_weights() {
        assert_close(n.var_ts, 0.0, "varTS");
        assert_close(n.var_effect, 0.0, "varEffect");
    }
}

// ---------------------------------------------------------------------------
// Document in, decomposition out
// ---------------------------------------------------------------------------

#[test]
fn document_pipeline_matches_builder_pipeline() {
    let doc = GraphDocument::parse(
        r#"{
            "directed": true,
            "graph": {"tsMethod": "freq", "netType": "cycle"},
            "nodes": [{"id": "A", "conc": 1}, {"id": "B", "conc": 1}, {"id": "C", "conc": 1}],
            "links": [
                {"source": "A", "target": "B"},
                {"source": "B", "target": "C"},
                {"source": "C", "target": "A"}
            ]
        }"#,
    )
    .unwrap();
    let from_doc = decompose(doc.into_input_graph().unwrap(), &DecompConfig::default()).unwrap();
    let built = directed(
        &["A", "B", "C"],
        &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)],
    );

    assert_eq!(from_doc.graph.content_hash, built.graph.content_hash);
    for label in ["A", "B", "C"] {
        assert_eq!(from_doc.graph.node(label), built.graph.node(label));
    }
    assert_eq!(
        from_doc.graph.attributes.get("netType"),
        Some(&serde_json::json!("cycle"))
    );
}
