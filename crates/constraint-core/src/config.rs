use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::DecompError;

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "cdecomp.toml";

/// How tie strengths were assigned upstream.
///
/// Only [`TieStrengthMethod::Equal`] changes the decomposition: every tie has
/// the same weight by construction, so the heterogeneity term `varTS` is
/// forced to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TieStrengthMethod {
    Equal,
    #[default]
    Freq,
    FreqExp,
    Rand,
    RandExp,
    RevRandExp,
}

impl TieStrengthMethod {
    pub const ALL: [Self; 6] = [
        Self::Equal,
        Self::Freq,
        Self::FreqExp,
        Self::Rand,
        Self::RandExp,
        Self::RevRandExp,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Freq => "freq",
            Self::FreqExp => "freqExp",
            Self::Rand => "rand",
            Self::RandExp => "randExp",
            Self::RevRandExp => "revRandExp",
        }
    }

    /// `true` when tie heterogeneity must be suppressed.
    #[must_use]
    pub const fn suppresses_variance(self) -> bool {
        matches!(self, Self::Equal)
    }
}

impl fmt::Display for TieStrengthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TieStrengthMethod {
    type Err = DecompError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DecompError::UnknownTieStrength(s.to_string()))
    }
}

/// Top-level configuration, loaded from `cdecomp.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecompConfig {
    #[serde(default)]
    pub decomp: DecompSection,
    #[serde(default)]
    pub centrality: CentralitySection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompSection {
    /// Fallback policy when the graph document carries no `tsMethod`.
    #[serde(default)]
    pub tie_strength: TieStrengthMethod,
    #[serde(default = "default_identity_tolerance")]
    pub identity_tolerance: f64,
    #[serde(default = "default_true")]
    pub verify_identity: bool,
}

impl Default for DecompSection {
    fn default() -> Self {
        Self {
            tie_strength: TieStrengthMethod::default(),
            identity_tolerance: default_identity_tolerance(),
            verify_identity: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentralitySection {
    /// Compute betweenness/clustering for nodes that arrive without them.
    #[serde(default = "default_true")]
    pub fill_missing: bool,
}

impl Default for CentralitySection {
    fn default() -> Self {
        Self {
            fill_missing: default_true(),
        }
    }
}

/// Load configuration from an explicit path, or from
/// [`DEFAULT_CONFIG_FILE`] under `working_dir` when it exists.
///
/// An explicit path that does not exist is an error; a missing default file
/// is not.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<DecompConfig> {
    let path: PathBuf = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let candidate = working_dir.join(DEFAULT_CONFIG_FILE);
            if !candidate.exists() {
                return Ok(DecompConfig::default());
            }
            candidate
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse configuration from TOML text.
///
/// # Errors
///
/// Returns an error if `content` is not valid TOML for [`DecompConfig`].
pub fn parse_config(content: &str) -> Result<DecompConfig> {
    let config = toml::from_str::<DecompConfig>(content)?;
    if !(config.decomp.identity_tolerance.is_finite() && config.decomp.identity_tolerance >= 0.0) {
        anyhow::bail!(
            "decomp.identity_tolerance must be a non-negative number, got {}",
            config.decomp.identity_tolerance
        );
    }
    Ok(config)
}

const fn default_true() -> bool {
    true
}

const fn default_identity_tolerance() -> f64 {
    1e-9
}
