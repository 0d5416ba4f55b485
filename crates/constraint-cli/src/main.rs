#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "cdecomp: structural constraint decomposition",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to `cdecomp.toml` in the working directory).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Decompose constraint for every node",
        long_about = "Symmetrize the graph, compute tie strengths and proportional ties, \
                      and split each node's constraint into DD, TB, ID, IR and CC.",
        after_help = "EXAMPLES:\n    # Print the node table\n    cdecomp decompose net.json\n\n    # Write the enriched document\n    cdecomp decompose net.json --out enriched.json\n\n    # Read from stdin with a fixed tie-strength policy\n    cat net.json | cdecomp decompose - --tie-strength equal --json"
    )]
    Decompose(cmd::decompose::DecomposeArgs),

    #[command(
        about = "Print the published correlation scalars",
        long_about = "Run the pipeline and print the Pearson correlations between node metrics.",
        after_help = "EXAMPLES:\n    # All scalars\n    cdecomp correlations net.json\n\n    # Only correlations against Ci\n    cdecomp correlations net.json --only Ci_\n\n    # Emit machine-readable output\n    cdecomp correlations net.json --json"
    )]
    Correlations(cmd::correlations::CorrelationsArgs),

    #[command(
        about = "Cross-check the decomposition",
        long_about = "Check existence symmetry, the Ci identity, and the quadriad terms \
                      against independent computations.",
        after_help = "EXAMPLES:\n    # Verify with the configured tolerance\n    cdecomp verify net.json\n\n    # Tighter tolerance\n    cdecomp verify net.json --tolerance 1e-12"
    )]
    Verify(cmd::verify::VerifyArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("CDECOMP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "constraint=debug,info"
        } else {
            "constraint=info,warn"
        })
    });

    let format = env::var("CDECOMP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let ctx = cmd::Context {
        output: cli.output_mode(),
        config_path: cli.config.clone(),
        working_dir: env::current_dir()?,
    };

    match &cli.command {
        Commands::Decompose(args) => cmd::decompose::run_decompose(args, &ctx),
        Commands::Correlations(args) => cmd::correlations::run_correlations(args, &ctx),
        Commands::Verify(args) => cmd::verify::run_verify(args, &ctx),
    }
}
