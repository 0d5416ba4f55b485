//! Subcommand handlers for `cdecomp`.

pub mod correlations;
pub mod decompose;
pub mod verify;

use std::path::{Path, PathBuf};

use clap::Args;
use constraint_core::config::{DecompConfig, TieStrengthMethod, load_config};
use constraint_core::decomp::{DecomposedGraph, decompose};
use constraint_core::graph::document::GraphDocument;
use tracing::debug;

use crate::output::{CliError, OutputMode, render_error};

/// Input and pipeline options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Graph document (JSON node-link form), or `-` for stdin.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Tie-strength policy; overrides the document's `tsMethod`.
    #[arg(long, value_name = "METHOD")]
    pub tie_strength: Option<TieStrengthMethod>,

    /// Fail on missing betweenness/clustering instead of computing them.
    #[arg(long)]
    pub no_fill_centrality: bool,

    /// Concentration weight for nodes that lack `conc`.
    #[arg(long, value_name = "VALUE")]
    pub default_conc: Option<f64>,
}

/// Global context resolved once in `main`.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    pub config_path: Option<PathBuf>,
    pub working_dir: PathBuf,
}

impl Context {
    /// Load the config file and apply command-line overrides.
    pub fn config(&self, args: &PipelineArgs) -> anyhow::Result<DecompConfig> {
        let mut config = match load_config(self.config_path.as_deref(), &self.working_dir) {
            Ok(config) => config,
            Err(err) => {
                render_error(
                    self.output,
                    &CliError::with_details(
                        format!("{err:#}"),
                        "check the [decomp] and [centrality] tables",
                        "invalid_config",
                    ),
                )?;
                return Err(err);
            }
        };
        if args.no_fill_centrality {
            config.centrality.fill_missing = false;
        }
        Ok(config)
    }
}

/// Read the document, apply overrides, and run the pipeline.
///
/// Failures are rendered through the output layer before being returned.
pub fn run_pipeline(
    ctx: &Context,
    args: &PipelineArgs,
    config: &DecompConfig,
) -> anyhow::Result<DecomposedGraph> {
    let doc = match GraphDocument::from_path(&args.input) {
        Ok(doc) => doc,
        Err(err) => {
            render_error(ctx.output, &CliError::new(format!("{err:#}")))?;
            return Err(err);
        }
    };
    debug!(
        nodes = doc.nodes.len(),
        links = doc.links.len(),
        input = %display_input(&args.input),
        "document loaded"
    );

    let result = doc.into_input_graph().and_then(|mut input| {
        if let Some(method) = args.tie_strength {
            input.tie_strength = Some(method);
        }
        if let Some(conc) = args.default_conc {
            input.fill_missing_conc(conc)?;
        }
        decompose(input, config)
    });

    match result {
        Ok(decomposed) => Ok(decomposed),
        Err(err) => {
            render_error(ctx.output, &CliError::from(&err))?;
            Err(err.into())
        }
    }
}

fn display_input(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}
