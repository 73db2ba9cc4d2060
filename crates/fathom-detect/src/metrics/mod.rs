//! Graph metrics for the bridge detector.
//!
//! - [`basic`]: degree, components, density, and the [`basic::GraphStats`] summary.
//! - [`betweenness`]: Brandes betweenness, exact or pivot-sampled.

pub mod basic;
pub mod betweenness;
