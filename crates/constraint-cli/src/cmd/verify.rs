use std::io::Write;

use anyhow::Result;
use clap::Args;
use constraint_core::verify::{VerificationReport, verify};

use super::{Context, PipelineArgs, run_pipeline};
use crate::output::{CliError, render_error, render_mode};

/// Arguments for `cdecomp verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Absolute tolerance; defaults to `decomp.identity_tolerance`.
    #[arg(long, value_name = "TOL")]
    pub tolerance: Option<f64>,
}

/// Decompose the input and cross-check every node.
///
/// # Errors
///
/// Returns an error when any check fails.
pub fn run_verify(args: &VerifyArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config(&args.pipeline)?;
    let tolerance = args.tolerance.unwrap_or(config.decomp.identity_tolerance);
    // The report covers the identity check; don't fail inside the pipeline.
    config.decomp.verify_identity = false;

    let decomposed = run_pipeline(ctx, &args.pipeline, &config)?;
    let report = match verify(&decomposed, tolerance) {
        Ok(report) => report,
        Err(err) => {
            render_error(ctx.output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };

    render_mode(ctx.output, &report, render_lines, render_lines)?;

    if report.passed() {
        Ok(())
    } else {
        anyhow::bail!("verify: failed");
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "OK  " } else { "FAIL" }
}

fn render_lines(report: &VerificationReport, w: &mut dyn Write) -> std::io::Result<()> {
    let tol = report.tolerance;
    writeln!(w, "{} existence symmetry", status(report.symmetric))?;
    writeln!(
        w,
        "{} Ci identity (max residual {:.3e})",
        status(report.max_identity_residual <= tol),
        report.max_identity_residual
    )?;
    writeln!(
        w,
        "{} closed-quadriad cross-check (max diff {:.3e})",
        status(report.max_closure_diff <= tol),
        report.max_closure_diff
    )?;
    match report.max_redundancy_diff {
        Some(diff) => writeln!(
            w,
            "{} open-quadriad brute force (max diff {diff:.3e})",
            status(diff <= tol)
        )?,
        None => writeln!(w, "SKIP open-quadriad brute force (graph too large)")?,
    }
    for label in &report.failing_nodes {
        writeln!(w, "FAIL node {label}")?;
    }
    if report.passed() {
        writeln!(w, "verify: success")?;
    }
    Ok(())
}
