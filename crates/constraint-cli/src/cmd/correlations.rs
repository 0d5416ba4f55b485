//! `cdecomp correlations`: print the published correlation scalars.


use clap::Args;
use constraint_core::decomp::correlation::CorrelationEntry;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::{Context, PipelineArgs, run_pipeline};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `cdecomp correlations`.
#[derive(Args, Debug)]
pub struct CorrelationsArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Only print scalars whose name contains this substring.
    #[arg(long, value_name = "SUBSTR")]
    pub only: Option<String>,
}

/// Selected entries, serialized as an object in publication order.
struct Selected<'a>(Vec<&'a CorrelationEntry>);

impl Serialize for Selected<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}

/// Execute `cdecomp correlations`.
pub fn run_correlations(args: &CorrelationsArgs, ctx: &Context) -> anyhow::Result<()> {
    let config = ctx.config(&args.pipeline)?;
    let decomposed = run_pipeline(ctx, &args.pipeline, &config)?;

    let selected = Selected(
        decomposed
            .correlations
            .iter()
            .filter(|e| args.only.as_deref().is_none_or(|s| e.name.contains(s)))
            .collect(),
    );

    let ts_method = decomposed.tie_strength;
    render_mode(
        ctx.output,
        &selected,
        |s, w| {
            for entry in &s.0 {
                writeln!(w, "{}\t{:.6}", entry.name, entry.value)?;
            }
            Ok(())
        },
        |s, w| {
            pretty_section(w, &format!("Correlations ({ts_method})"))?;
            for entry in &s.0 {
                pretty_kv(w, &entry.name, format!("{:+.6}", entry.value))?;
            }
            Ok(())
        },
    )
}
