#![forbid(unsafe_code)]
//! constraint-core library.
//!
//! Decomposes Burt's structural constraint over a weighted directed graph
//! into dyadic (DD), triadic cross (TB), indirect (ID), open-quadriad (IR)
//! and closed-quadriad (CC) components, and attaches a fixed battery of
//! correlations between the resulting node metrics.
//!
//! # Conventions
//!
//! - **Errors**: Core operations return [`error::DecompError`]; IO edges
//!   (config and document loading) use `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Ordering**: Node insertion index is the total order for every
//!   deduplication comparison. See [`graph::build`].
//!
//! # Typical Usage
//!
//! ```rust,ignore
//! use constraint_core::config::DecompConfig;
//! use constraint_core::decomp::decompose;
//! use constraint_core::graph::document::GraphDocument;
//!
//! let doc = GraphDocument::from_path("net.json")?;
//! let input = doc.into_input_graph()?;
//! let enriched = decompose(input, &DecompConfig::default())?;
//! println!("Ci_DD = {}", enriched.correlations.get("Ci_DD").unwrap_or(0.0));
//! ```

pub mod config;
pub mod decomp;
pub mod error;
pub mod export;
pub mod graph;
pub mod metrics;
pub mod verify;

pub use config::{DecompConfig, TieStrengthMethod};
pub use decomp::{DecomposedGraph, decompose};
pub use error::DecompError;
pub use graph::build::InputGraph;
