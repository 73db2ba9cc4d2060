//! Entity co-occurrence graph.
//!
//! - [`build`]: per-document entity sets to a weighted undirected graph,
//!   sequential or partitioned across worker threads.
//! - [`export`]: node and edge lists for the run report.

pub mod build;
pub mod export;

pub use build::{CooccurrenceGraph, Evidence, PartialGraph};
pub use export::{EdgeExport, GraphExport, NodeExport};
