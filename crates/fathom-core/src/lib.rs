#![forbid(unsafe_code)]
//! fathom-core library.
//!
//! Shared vocabulary for every fathom crate: the citation-tagged fact model,
//! contract-checked findings, analysis configuration, and error codes.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums per concern, each mapping to an
//!   [`error::ErrorCode`]; `anyhow` only at the binary boundary.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod input;
pub mod model;

pub use config::AnalysisConfig;
pub use error::ErrorCode;
