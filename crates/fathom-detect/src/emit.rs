//! Finding emission.
//!
//! Turns detector reports into [`Finding`] records. Every record goes
//! through [`Finding::try_new`], so a detector that produces an uncited or
//! mis-shaped result fails with an [`EmitError`] instead of emitting it.

use fathom_core::config::DigitConfig;
use fathom_core::model::{
    BridgeMetrics, DigitMetrics, EmitError, Finding, FindingKind, Metrics, SilenceMetrics, Subject,
};
use rust_decimal::Decimal;

use crate::bridge::BridgeReport;
use crate::digits::DigitReport;
use crate::graph::CooccurrenceGraph;
use crate::timeline::SilenceReport;

/// One `bridge_entity` finding per selected bridge, in rank order.
///
/// # Errors
///
/// [`EmitError`] when a bridge has no mention citations.
pub fn bridge_findings(
    report: &BridgeReport,
    graph: &CooccurrenceGraph,
) -> Result<Vec<Finding>, EmitError> {
    let kind = FindingKind::BridgeEntity;
    report
        .bridges
        .iter()
        .map(|b| {
            Finding::try_new(
                kind,
                kind.default_severity(),
                Subject::Entity(b.entity.clone()),
                Metrics::Bridge(BridgeMetrics {
                    centrality: b.centrality,
                    degree: b.degree,
                    document_count: graph.entity_documents(&b.entity).len(),
                    sampled: report.method.is_sampled(),
                }),
                graph.entity_citations(&b.entity),
            )
        })
        .collect()
}

/// Shared evidence payload for a digit group.
#[must_use]
pub fn digit_metrics(report: &DigitReport, config: &DigitConfig) -> DigitMetrics {
    let benford = report.benford.test();
    let round = report.round.test();
    DigitMetrics {
        sample_size: report.sample_size,
        leading_digit_counts: report.leading_digit_counts,
        chi_square: benford.map(|t| t.chi_square),
        p_value: benford.map(|t| t.p_value),
        chi_square_threshold: config.chi_square_threshold,
        round_count: round.map_or(0, |t| t.round_count),
        round_fraction: round.map_or(Decimal::ZERO, |t| t.round_fraction),
        round_fraction_threshold: config.round_number_fraction_threshold,
        divisor_counts: round.map(|t| t.divisor_counts.clone()).unwrap_or_default(),
        low_confidence: round.is_none_or(|t| t.low_confidence),
    }
}

/// `benfords_violation` and `round_number_anomaly` findings, group by group.
///
/// # Errors
///
/// [`EmitError`] when a flagged group carries no citations.
pub fn digit_findings(
    reports: &[DigitReport],
    config: &DigitConfig,
) -> Result<Vec<Finding>, EmitError> {
    let mut out = Vec::new();
    for report in reports {
        let flagged = [
            (FindingKind::BenfordsViolation, report.benford.is_violation()),
            (FindingKind::RoundNumberAnomaly, report.round.is_flagged()),
        ];
        for (kind, hit) in flagged {
            if !hit {
                continue;
            }
            out.push(Finding::try_new(
                kind,
                kind.default_severity(),
                report.subject.clone(),
                Metrics::DigitDistribution(digit_metrics(report, config)),
                report.citations.clone(),
            )?);
        }
    }
    Ok(out)
}

/// One `silence_interval` finding per interval, in report order.
///
/// # Errors
///
/// Only on an internal contract violation.
pub fn silence_findings(report: &SilenceReport) -> Result<Vec<Finding>, EmitError> {
    let kind = FindingKind::SilenceInterval;
    report
        .intervals
        .iter()
        .map(|i| {
            Finding::try_new(
                kind,
                kind.default_severity(),
                Subject::DateRange {
                    start: i.start,
                    end: i.end,
                },
                Metrics::Silence(SilenceMetrics {
                    start_date: i.start,
                    end_date: i.end,
                    gap_days: i.gap_days,
                }),
                vec![i.before.clone(), i.after.clone()],
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeCandidate;
    use crate::digits::{BenfordOutcome, RoundOutcome, RoundTest};
    use crate::metrics::betweenness::CentralityMethod;
    use crate::timeline::SilenceInterval;
    use chrono::NaiveDate;
    use fathom_core::config::GraphConfig;
    use fathom_core::model::{Citation, DocumentEntities, Severity};

    #[test]
    fn bridge_without_edges_fails_loudly() {
        let empty = CooccurrenceGraph::build(&[], &GraphConfig::default());
        let report = BridgeReport {
            ranked: vec![],
            bridges: vec![BridgeCandidate {
                entity: "ghost".into(),
                centrality: 0.5,
                degree: 1,
            }],
            method: CentralityMethod::Exact,
        };
        let err = bridge_findings(&report, &empty).unwrap_err();
        assert!(matches!(err, EmitError::MissingCitations { .. }));
    }

    #[test]
    fn bridge_findings_carry_mention_citations() {
        let docs = vec![
            DocumentEntities::new(Citation::new("d1", "h1", "d1.pdf", 3), vec!["a".into(), "b".into()]),
            DocumentEntities::new(Citation::new("d2", "h2", "d2.pdf", 9), vec!["b".into(), "c".into()]),
        ];
        let g = CooccurrenceGraph::build(&docs, &GraphConfig::default());
        let report = BridgeReport {
            ranked: vec![],
            bridges: vec![BridgeCandidate {
                entity: "b".into(),
                centrality: 1.0,
                degree: 2,
            }],
            method: CentralityMethod::Exact,
        };
        let findings = bridge_findings(&report, &g).expect("emit");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity(), Severity::High);
        assert_eq!(findings[0].citations().len(), 2);
        match findings[0].metrics() {
            Metrics::Bridge(m) => {
                assert_eq!(m.document_count, 2);
                assert!(!m.sampled);
            }
            other => panic!("unexpected metrics {other:?}"),
        }
    }

    #[test]
    fn unflagged_digit_groups_emit_nothing() {
        let report = DigitReport {
            subject: Subject::Corpus,
            sample_size: 3,
            leading_digit_counts: [1, 1, 1, 0, 0, 0, 0, 0, 0],
            benford: BenfordOutcome::Skipped {
                required: 30,
                actual: 3,
            },
            round: RoundOutcome::Tested(RoundTest {
                sample_size: 3,
                round_count: 0,
                round_fraction: Decimal::ZERO,
                threshold: Decimal::new(30, 2),
                divisor_counts: vec![],
                flagged: false,
                low_confidence: true,
            }),
            citations: vec![Citation::new("d", "h", "d.pdf", 1)],
        };
        let cfg = DigitConfig::default();
        assert!(digit_findings(&[report.clone()], &cfg).expect("emit").is_empty());

        let m = digit_metrics(&report, &cfg);
        assert_eq!(m.chi_square, None);
        assert!(m.low_confidence);
    }

    #[test]
    fn silence_findings_are_medium_with_two_citations() {
        let start = NaiveDate::from_ymd_opt(2005, 1, 10).expect("date");
        let end = NaiveDate::from_ymd_opt(2005, 3, 1).expect("date");
        let report = SilenceReport {
            intervals: vec![SilenceInterval {
                start,
                end,
                gap_days: 50,
                before: Citation::new("a", "h", "a.pdf", 1),
                after: Citation::new("b", "h", "b.pdf", 1),
            }],
            dates_considered: 3,
        };
        let findings = silence_findings(&report).expect("emit");
        assert_eq!(findings[0].severity(), Severity::Medium);
        assert_eq!(findings[0].citations().len(), 2);
        assert_eq!(findings[0].subject(), &Subject::DateRange { start, end });
    }
}
