//! Regression tests for silence-interval detection and emission.

use chrono::NaiveDate;
use fathom_core::config::SilenceConfig;
use fathom_core::model::{Citation, DateFact, FindingKind, Metrics, Severity, Subject};
use fathom_detect::emit::silence_findings;
use fathom_detect::timeline::{detect_silence, temporal_profile};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
}

fn fact(s: &str, doc: &str) -> DateFact {
    DateFact::new(date(s), doc, Citation::new(doc, format!("sha-{doc}"), format!("{doc}.pdf"), 1))
        .expect("fact")
}

#[test]
fn single_fifty_day_gap() {
    let dates = vec![
        fact("2005-03-01", "flight-log-3"),
        fact("2005-01-01", "flight-log-1"),
        fact("2005-01-10", "flight-log-2"),
    ];
    let report = detect_silence(&dates, &SilenceConfig::default());
    assert_eq!(report.intervals.len(), 1);
    let gap = &report.intervals[0];
    assert_eq!(gap.start, date("2005-01-10"));
    assert_eq!(gap.end, date("2005-03-01"));
    assert_eq!(gap.gap_days, 50);

    let findings = silence_findings(&report).expect("emit");
    assert_eq!(findings.len(), 1);
    let f = &findings[0];
    assert_eq!(f.kind(), FindingKind::SilenceInterval);
    assert_eq!(f.severity(), Severity::Medium);
    assert_eq!(
        f.subject(),
        &Subject::DateRange {
            start: date("2005-01-10"),
            end: date("2005-03-01")
        }
    );
    let docs: Vec<&str> = f.citations().iter().map(|c| c.document_id.as_str()).collect();
    assert_eq!(docs, vec!["flight-log-2", "flight-log-3"]);
    match f.metrics() {
        Metrics::Silence(m) => assert_eq!(m.gap_days, 50),
        other => panic!("unexpected metrics {other:?}"),
    }
}

#[test]
fn dense_timeline_has_no_silence() {
    let start = date("2003-01-01");
    let dates: Vec<DateFact> = (0..30)
        .map(|i| {
            let d = start + chrono::Duration::days(i * 20);
            fact(&d.format("%Y-%m-%d").to_string(), "calendar")
        })
        .collect();
    let report = detect_silence(&dates, &SilenceConfig::default());
    assert!(report.intervals.is_empty());
    assert_eq!(report.dates_considered, 30);
}

#[test]
fn profile_accompanies_detection() {
    let dates = vec![
        fact("2005-01-01", "a"),
        fact("2005-01-10", "b"),
        fact("2005-03-01", "c"),
        fact("2006-03-15", "d"),
    ];
    let profile = temporal_profile(&dates);
    assert_eq!(profile.first, Some(date("2005-01-01")));
    assert_eq!(profile.last, Some(date("2006-03-15")));
    assert_eq!(profile.by_year.get(&2005), Some(&3));
    assert_eq!(profile.by_month.get(&3), Some(&2));

    let report = detect_silence(&dates, &SilenceConfig::default());
    let gaps: Vec<i64> = report.intervals.iter().map(|i| i.gap_days).collect();
    assert_eq!(gaps, vec![379, 50]);
}
