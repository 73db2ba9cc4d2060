#![forbid(unsafe_code)]
//! fathom-detect library.
//!
//! Detectors over citation-tagged facts:
//!
//! - [`graph`]: entity co-occurrence graph construction.
//! - [`metrics`]: degree, components, and Brandes betweenness.
//! - [`bridge`]: bridge-entity ranking.
//! - [`digits`]: Benford and round-number tests on amounts.
//! - [`timeline`]: silence intervals and temporal profile.
//! - [`emit`]: contract-checked finding emission.
//! - [`pipeline`]: concurrent batch run over all detectors.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums; insufficient data is an outcome, not an error.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod bridge;
pub mod digits;
pub mod emit;
pub mod graph;
pub mod metrics;
pub mod pipeline;
pub mod timeline;

pub use pipeline::{Detector, DetectorError, RunReport, run_all};
