//! Silence-interval detection.
//!
//! Dates are sorted (ties broken by citation) and each pair of consecutive
//! dates forms a gap. Gaps longer than `min_gap_days` are periods in which
//! the corpus records no activity at all.

use chrono::NaiveDate;
use fathom_core::config::SilenceConfig;
use fathom_core::model::{Citation, DateFact};
use serde::Serialize;
use tracing::{debug, instrument};

/// A qualifying gap, bounded by the facts on either side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SilenceInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub gap_days: i64,
    /// Last fact before the gap.
    pub before: Citation,
    /// First fact after the gap.
    pub after: Citation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SilenceReport {
    /// Sorted by `gap_days` descending, then `start` ascending.
    pub intervals: Vec<SilenceInterval>,
    pub dates_considered: usize,
}

/// Find every gap that crosses the configured threshold.
///
/// Fewer than two dates yields an empty report. Zero-length gaps from
/// duplicate dates never qualify.
#[must_use]
#[instrument(skip_all, fields(dates = dates.len()))]
pub fn detect_silence(dates: &[DateFact], config: &SilenceConfig) -> SilenceReport {
    let mut sorted: Vec<&DateFact> = dates.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.citation.cmp(&b.citation)));

    let mut intervals: Vec<SilenceInterval> = sorted
        .windows(2)
        .filter_map(|pair| {
            let (prev, next) = (pair[0], pair[1]);
            let gap = (next.date - prev.date).num_days();
            (gap > 0 && config.boundary.admits(&gap, &config.min_gap_days)).then(|| SilenceInterval {
                start: prev.date,
                end: next.date,
                gap_days: gap,
                before: prev.citation.clone(),
                after: next.citation.clone(),
            })
        })
        .collect();

    intervals.sort_by(|a, b| b.gap_days.cmp(&a.gap_days).then(a.start.cmp(&b.start)));

    debug!(
        intervals = intervals.len(),
        longest = intervals.first().map_or(0, |i| i.gap_days),
        "silence scan complete"
    );

    SilenceReport {
        intervals,
        dates_considered: sorted.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fathom_core::config::Boundary;

    fn fact(date: &str, doc: &str, page: u32) -> DateFact {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date");
        DateFact::new(date, doc, Citation::new(doc, "h", format!("{doc}.pdf"), page)).expect("fact")
    }

    #[test]
    fn fewer_than_two_dates_is_empty() {
        let cfg = SilenceConfig::default();
        assert!(detect_silence(&[], &cfg).intervals.is_empty());
        assert!(detect_silence(&[fact("2005-01-01", "d", 1)], &cfg).intervals.is_empty());
    }

    #[test]
    fn duplicate_dates_never_qualify() {
        let cfg = SilenceConfig {
            min_gap_days: 0,
            boundary: Boundary::Inclusive,
        };
        let report = detect_silence(&[fact("2005-01-01", "a", 1), fact("2005-01-01", "b", 1)], &cfg);
        assert!(report.intervals.is_empty());
    }

    #[test]
    fn exactly_threshold_depends_on_boundary() {
        let dates = [fact("2005-01-01", "a", 1), fact("2005-01-21", "b", 1)];
        let exclusive = detect_silence(&dates, &SilenceConfig::default());
        assert!(exclusive.intervals.is_empty(), "20 days is not > 20");

        let inclusive = detect_silence(
            &dates,
            &SilenceConfig {
                boundary: Boundary::Inclusive,
                ..SilenceConfig::default()
            },
        );
        assert_eq!(inclusive.intervals.len(), 1);
        assert_eq!(inclusive.intervals[0].gap_days, 20);
    }

    #[test]
    fn citations_bracket_the_gap() {
        let report = detect_silence(
            &[
                fact("2005-03-01", "late", 4),
                fact("2005-01-10", "early", 2),
                fact("2005-01-10", "early", 1),
            ],
            &SilenceConfig::default(),
        );
        assert_eq!(report.intervals.len(), 1);
        let gap = &report.intervals[0];
        // Ties sort by citation, so page 2 is the last fact before the gap.
        assert_eq!(gap.before.page_number, 2);
        assert_eq!(gap.after.document_id, "late");
    }

    #[test]
    fn longest_gap_first_then_earliest() {
        let report = detect_silence(
            &[
                fact("2000-01-01", "a", 1),
                fact("2000-02-01", "a", 1),
                fact("2000-04-01", "a", 1),
                fact("2000-05-02", "a", 1),
            ],
            &SilenceConfig::default(),
        );
        let gaps: Vec<(i64, NaiveDate)> = report.intervals.iter().map(|i| (i.gap_days, i.start)).collect();
        assert_eq!(gaps[0].0, 60);
        assert_eq!(gaps[1].0, 31);
        assert_eq!(gaps[2].0, 31);
        assert!(gaps[1].1 < gaps[2].1);
    }
}
