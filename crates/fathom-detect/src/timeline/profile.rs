use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use fathom_core::model::DateFact;
use serde::Serialize;

/// Shape of a timeline: its extent and how dated activity is spread over
/// years and calendar months.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemporalProfile {
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    /// Days from `first` to `last`; 0 for fewer than two distinct dates.
    pub span_days: i64,
    pub total: usize,
    pub by_year: BTreeMap<i32, usize>,
    /// Keyed by calendar month, 1 through 12, pooled across years.
    pub by_month: BTreeMap<u32, usize>,
}

#[must_use]
pub fn temporal_profile(dates: &[DateFact]) -> TemporalProfile {
    let mut profile = TemporalProfile {
        total: dates.len(),
        ..TemporalProfile::default()
    };

    for fact in dates {
        let d = fact.date;
        profile.first = Some(profile.first.map_or(d, |f| f.min(d)));
        profile.last = Some(profile.last.map_or(d, |l| l.max(d)));
        *profile.by_year.entry(d.year()).or_default() += 1;
        *profile.by_month.entry(d.month()).or_default() += 1;
    }

    if let (Some(first), Some(last)) = (profile.first, profile.last) {
        profile.span_days = (last - first).num_days();
    }
    profile
}
