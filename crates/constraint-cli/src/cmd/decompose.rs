//! `cdecomp decompose`: run the pipeline and emit the enriched graph.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::Args;
use constraint_core::export::{EdgeRecord, EnrichedDocument, NodeRecord};
use serde::Serialize;
use tracing::info;

use super::{Context, PipelineArgs, run_pipeline};
use crate::output::{
    CliError, fmt_opt, pretty_kv, pretty_rule, pretty_section, render_error, render_mode,
};

/// Arguments for `cdecomp decompose`.
#[derive(Args, Debug)]
pub struct DecomposeArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Write the enriched document as JSON to this path.
    #[arg(long, short, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Include per-edge rows in pretty/text output.
    #[arg(long)]
    pub edges: bool,

    /// Restrict printed rows to these node ids (repeatable). Ignored with `--out`.
    #[arg(long = "node", value_name = "ID")]
    pub nodes: Vec<String>,
}

/// Summary printed after writing `--out`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WrittenSummary {
    out: String,
    nodes: usize,
    links: usize,
    ts_method: String,
    content_hash: String,
}

/// Execute `cdecomp decompose`.
pub fn run_decompose(args: &DecomposeArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.config(&args.pipeline)?;
    let decomposed = run_pipeline(ctx, &args.pipeline, &config)?;
    let mut doc = EnrichedDocument::from_decomposed(&decomposed);

    if let Some(path) = &args.out {
        let json = doc.to_json_pretty()?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote enriched document");

        let summary = WrittenSummary {
            out: path.display().to_string(),
            nodes: doc.nodes.len(),
            links: doc.links.len(),
            ts_method: doc.graph.ts_method.to_string(),
            content_hash: doc.graph.content_hash.clone(),
        };
        return render_mode(
            ctx.output,
            &summary,
            |s, w| writeln!(w, "{}\t{}\t{}", s.out, s.nodes, s.links),
            |s, w| {
                pretty_section(w, "Decomposition written")?;
                pretty_kv(w, "Path", &s.out)?;
                pretty_kv(w, "Nodes", s.nodes.to_string())?;
                pretty_kv(w, "Links", s.links.to_string())?;
                pretty_kv(w, "Tie strength", &s.ts_method)?;
                pretty_kv(w, "Content hash", &s.content_hash)
            },
        );
    }

    if !args.nodes.is_empty() {
        for id in &args.nodes {
            if let Err(err) = decomposed.graph.require_node(id) {
                render_error(ctx.output, &CliError::from(&err))?;
                return Err(err.into());
            }
        }
        doc.nodes.retain(|n| args.nodes.contains(&n.id));
        doc.links.retain(|l| args.nodes.contains(&l.source));
    }

    let edges = args.edges;
    render_mode(
        ctx.output,
        &doc,
        |d, w| render_text(d, edges, w),
        |d, w| render_pretty(d, edges, w),
    )
}

const NODE_HEADERS: [&str; 10] = ["id", "degree", "Ci", "DD", "TB", "ID", "IR", "CC", "QS", "conc"];
const EDGE_HEADERS: [&str; 5] = ["source", "target", "weight", "pij", "aggIndirect"];

fn node_cells(n: &NodeRecord) -> [String; 10] {
    [
        n.id.clone(),
        n.degree.to_string(),
        format!("{:.6}", n.Ci),
        format!("{:.6}", n.DD),
        format!("{:.6}", n.TB),
        format!("{:.6}", n.ID),
        format!("{:.6}", n.IR),
        format!("{:.6}", n.CC),
        format!("{:.6}", n.QS),
        fmt_opt(n.conc),
    ]
}

fn edge_cells(e: &EdgeRecord) -> [String; 5] {
    [
        e.source.clone(),
        e.target.clone(),
        format!("{:.6}", e.weight),
        fmt_opt(e.pij),
        format!("{:.6}", e.agg_indirect),
    ]
}

fn render_text(doc: &EnrichedDocument, edges: bool, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "{}", NODE_HEADERS.join("\t"))?;
    for n in &doc.nodes {
        writeln!(w, "{}", node_cells(n).join("\t"))?;
    }
    if edges {
        writeln!(w)?;
        writeln!(w, "{}", EDGE_HEADERS.join("\t"))?;
        for e in &doc.links {
            writeln!(w, "{}", edge_cells(e).join("\t"))?;
        }
    }
    Ok(())
}

fn render_pretty(doc: &EnrichedDocument, edges: bool, w: &mut dyn Write) -> std::io::Result<()> {
    let stats = &doc.graph.stats;
    pretty_section(w, "Constraint decomposition")?;
    pretty_kv(w, "Tie strength", doc.graph.ts_method.as_str())?;
    pretty_kv(w, "Nodes", stats.node_count.to_string())?;
    pretty_kv(
        w,
        "Edges",
        format!(
            "{} ({} input, {} reciprocal)",
            stats.edge_count, stats.input_edge_count, stats.reciprocals_added
        ),
    )?;
    pretty_kv(w, "Isolates", stats.isolate_count.to_string())?;
    pretty_kv(w, "Density", format!("{:.4}", stats.density))?;
    pretty_kv(w, "Content hash", &doc.graph.content_hash)?;
    writeln!(w)?;

    let rows: Vec<[String; 10]> = doc.nodes.iter().map(node_cells).collect();
    write_table(w, &NODE_HEADERS, &rows)?;

    if edges {
        writeln!(w)?;
        let rows: Vec<[String; 5]> = doc.links.iter().map(edge_cells).collect();
        write_table(w, &EDGE_HEADERS, &rows)?;
    }
    Ok(())
}

/// Column-aligned table: first column left-aligned, the rest right-aligned.
fn write_table<const N: usize>(
    w: &mut dyn Write,
    headers: &[&str; N],
    rows: &[[String; N]],
) -> std::io::Result<()> {
    let mut widths = headers.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    write_row(w, headers, &widths)?;
    pretty_rule(w)?;
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        write_row(w, &cells, &widths)?;
    }
    Ok(())
}

fn write_row(w: &mut dyn Write, cells: &[&str], widths: &[usize]) -> std::io::Result<()> {
    for (i, (cell, width)) in cells.iter().zip(widths.iter().copied()).enumerate() {
        if i == 0 {
            write!(w, "{cell:<width$}")?;
        } else {
            write!(w, "  {cell:>width$}")?;
        }
    }
    writeln!(w)
}
