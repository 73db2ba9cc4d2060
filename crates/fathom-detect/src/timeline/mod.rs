//! Timeline analysis over resolved dates.
//!
//! - [`silence`]: gaps in dated activity above a threshold.
//! - [`profile`]: extent and year/month distribution of the timeline.

pub mod profile;
pub mod silence;

pub use profile::{TemporalProfile, temporal_profile};
pub use silence::{SilenceInterval, SilenceReport, detect_silence};
