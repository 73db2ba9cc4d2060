//! Data model shared by every detector.
//!
//! - [`citation`]: provenance tuple attached to every fact.
//! - [`fact`]: validated entity mentions, amounts, and dates.
//! - [`finding`]: contract-checked detector output.

pub mod citation;
pub mod fact;
pub mod finding;

pub use citation::Citation;
pub use fact::{
    Amount, DateFact, DocumentEntities, EntityMention, FactError, canonicalize_entity,
    group_mentions, parse_amount, parse_date,
};
pub use finding::{
    BridgeMetrics, DigitMetrics, DivisorCount, EmitError, Finding, FindingKind, Metrics,
    Severity, SilenceMetrics, Subject,
};
