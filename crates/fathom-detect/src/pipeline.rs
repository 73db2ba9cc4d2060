//! Full-corpus batch run.
//!
//! Each selected [`Detector`] is a pure function over the validated facts
//! and runs on the rayon pool alongside the others. A detector that fails
//! is reported as failed in the [`RunReport`]; the remaining detectors'
//! findings are still returned.

use std::fmt;
use std::str::FromStr;

use fathom_core::config::AnalysisConfig;
use fathom_core::error::ErrorCode;
use fathom_core::input::{RejectedRecord, ValidatedFacts};
use fathom_core::model::{EmitError, Finding};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::bridge::{BridgeCandidate, detect_bridges};
use crate::digits::{DigitReport, analyze_amounts};
use crate::emit::{bridge_findings, digit_findings, silence_findings};
use crate::graph::{CooccurrenceGraph, GraphExport};
use crate::metrics::basic::GraphStats;
use crate::metrics::betweenness::{CentralityError, CentralityMethod};
use crate::timeline::{TemporalProfile, detect_silence, temporal_profile};

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detector {
    Bridges,
    Digits,
    Silence,
}

impl Detector {
    pub const ALL: [Self; 3] = [Self::Bridges, Self::Digits, Self::Silence];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bridges => "bridges",
            Self::Digits => "digits",
            Self::Silence => "silence",
        }
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Detector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bridges" | "bridge" => Ok(Self::Bridges),
            "digits" | "digit" => Ok(Self::Digits),
            "silence" => Ok(Self::Silence),
            other => Err(format!(
                "unknown detector '{other}' (expected bridges, digits, or silence)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors and status
// ---------------------------------------------------------------------------

/// Fatal for one detector only.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectorError {
    #[error(transparent)]
    Centrality(#[from] CentralityError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

impl DetectorError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Centrality(e) => e.code(),
            Self::Emit(e) => e.code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectorStatus {
    Completed { findings: usize },
    Failed { code: ErrorCode, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectorSummary {
    pub detector: Detector,
    #[serde(flatten)]
    pub status: DetectorStatus,
}

// ---------------------------------------------------------------------------
// Run report
// ---------------------------------------------------------------------------

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub findings: Vec<Finding>,
    pub detectors: Vec<DetectorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphStats>,
    /// Edge list with per-edge document ids, plus per-node degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooccurrence: Option<GraphExport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centrality: Option<CentralityMethod>,
    /// Top of the centrality ranking, bridges or not.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ranking: Vec<BridgeCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<TemporalProfile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub digits: Vec<DigitReport>,
    pub rejected: Vec<RejectedRecord>,
}

impl RunReport {
    /// `true` if any detector failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.detectors
            .iter()
            .any(|d| matches!(d.status, DetectorStatus::Failed { .. }))
    }
}

/// Per-detector output before it is folded into the report.
#[derive(Debug)]
pub enum DetectorOutput {
    Bridges {
        stats: GraphStats,
        export: GraphExport,
        method: CentralityMethod,
        ranking: Vec<BridgeCandidate>,
        findings: Vec<Finding>,
    },
    Digits {
        reports: Vec<DigitReport>,
        findings: Vec<Finding>,
    },
    Silence {
        profile: TemporalProfile,
        findings: Vec<Finding>,
    },
}

impl DetectorOutput {
    fn findings_len(&self) -> usize {
        match self {
            Self::Bridges { findings, .. }
            | Self::Digits { findings, .. }
            | Self::Silence { findings, .. } => findings.len(),
        }
    }
}

/// Run a single detector.
///
/// # Errors
///
/// [`DetectorError`] on a centrality failure or an emitter contract
/// violation.
#[instrument(skip(facts, config))]
pub fn run_detector(
    detector: Detector,
    facts: &ValidatedFacts,
    config: &AnalysisConfig,
) -> Result<DetectorOutput, DetectorError> {
    match detector {
        Detector::Bridges => {
            let graph = CooccurrenceGraph::from_mentions(&facts.mentions, &config.graph);
            let report = detect_bridges(&graph, &config.bridge)?;
            let findings = bridge_findings(&report, &graph)?;
            Ok(DetectorOutput::Bridges {
                stats: GraphStats::of(&graph),
                export: GraphExport::of(&graph),
                method: report.method,
                ranking: report.ranked.into_iter().take(config.bridge.ranking_size).collect(),
                findings,
            })
        }
        Detector::Digits => {
            let reports = analyze_amounts(&facts.amounts, &config.digits);
            let findings = digit_findings(&reports, &config.digits)?;
            Ok(DetectorOutput::Digits { reports, findings })
        }
        Detector::Silence => {
            let report = detect_silence(&facts.dates, &config.silence);
            let findings = silence_findings(&report)?;
            Ok(DetectorOutput::Silence {
                profile: temporal_profile(&facts.dates),
                findings,
            })
        }
    }
}

/// Run the selected detectors concurrently and assemble the report.
///
/// Detectors run at most once each, and their findings appear in the order
/// the detectors were listed.
#[must_use]
#[instrument(skip_all, fields(detectors = ?detectors))]
pub fn run_all(facts: &ValidatedFacts, config: &AnalysisConfig, detectors: &[Detector]) -> RunReport {
    run_all_with(facts, config, detectors, run_detector)
}

/// [`run_all`] with the per-detector step supplied by the caller.
pub(crate) fn run_all_with<F>(
    facts: &ValidatedFacts,
    config: &AnalysisConfig,
    detectors: &[Detector],
    runner: F,
) -> RunReport
where
    F: Fn(Detector, &ValidatedFacts, &AnalysisConfig) -> Result<DetectorOutput, DetectorError> + Sync,
{
    let mut selected: Vec<Detector> = Vec::with_capacity(detectors.len());
    for d in detectors {
        if !selected.contains(d) {
            selected.push(*d);
        }
    }

    let outcomes: Vec<(Detector, Result<DetectorOutput, DetectorError>)> = selected
        .par_iter()
        .map(|&d| (d, runner(d, facts, config)))
        .collect();

    let mut report = RunReport {
        findings: Vec::new(),
        detectors: Vec::with_capacity(outcomes.len()),
        graph: None,
        cooccurrence: None,
        centrality: None,
        ranking: Vec::new(),
        timeline: None,
        digits: Vec::new(),
        rejected: facts.rejected.clone(),
    };

    for (detector, outcome) in outcomes {
        let status = match outcome {
            Ok(output) => {
                let count = output.findings_len();
                match output {
                    DetectorOutput::Bridges {
                        stats,
                        export,
                        method,
                        ranking,
                        findings,
                    } => {
                        report.graph = Some(stats);
                        report.cooccurrence = Some(export);
                        report.centrality = Some(method);
                        report.ranking = ranking;
                        report.findings.extend(findings);
                    }
                    DetectorOutput::Digits { reports, findings } => {
                        report.digits = reports;
                        report.findings.extend(findings);
                    }
                    DetectorOutput::Silence { profile, findings } => {
                        report.timeline = Some(profile);
                        report.findings.extend(findings);
                    }
                }
                DetectorStatus::Completed { findings: count }
            }
            Err(e) => {
                warn!(%detector, code = %e.code(), error = %e, "detector failed");
                DetectorStatus::Failed {
                    code: e.code(),
                    error: e.to_string(),
                }
            }
        };
        report.detectors.push(DetectorSummary { detector, status });
    }

    info!(
        findings = report.findings.len(),
        rejected = report.rejected.len(),
        failed = report.has_failures(),
        "analysis run complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fathom_core::model::{Amount, Citation, DateFact, EntityMention, FindingKind};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn detector_names_parse() {
        assert_eq!("Bridges".parse::<Detector>(), Ok(Detector::Bridges));
        assert_eq!(" silence ".parse::<Detector>(), Ok(Detector::Silence));
        assert!("benford".parse::<Detector>().is_err());
        for d in Detector::ALL {
            assert_eq!(d.as_str().parse::<Detector>(), Ok(d));
        }
    }

    #[test]
    fn empty_facts_complete_every_detector() {
        let report = run_all(
            &ValidatedFacts::default(),
            &AnalysisConfig::default(),
            &Detector::ALL,
        );
        assert!(report.findings.is_empty());
        assert!(!report.has_failures());
        assert_eq!(report.detectors.len(), 3);
        assert_eq!(report.graph.as_ref().map(|g| g.nodes), Some(0));
        assert_eq!(report.timeline.as_ref().map(|t| t.total), Some(0));
    }

    #[test]
    fn duplicate_selection_runs_once() {
        let report = run_all(
            &ValidatedFacts::default(),
            &AnalysisConfig::default(),
            &[Detector::Silence, Detector::Silence],
        );
        assert_eq!(report.detectors.len(), 1);
        assert!(report.graph.is_none());
    }

    fn failing_bridges(
        detector: Detector,
        facts: &ValidatedFacts,
        config: &AnalysisConfig,
    ) -> Result<DetectorOutput, DetectorError> {
        match detector {
            Detector::Bridges => Err(CentralityError::NonFinite {
                entity: "courier".into(),
                value: f64::NAN,
            }
            .into()),
            other => run_detector(other, facts, config),
        }
    }

    fn mixed_facts() -> ValidatedFacts {
        let cite = |doc: &str, page: u32| Citation::new(doc, format!("h-{doc}"), format!("{doc}.pdf"), page);
        let date = |d: &str, page: u32| {
            DateFact::new(NaiveDate::from_str(d).unwrap(), "log", cite("log", page)).unwrap()
        };
        ValidatedFacts {
            mentions: vec![
                EntityMention::new("A", "d1", cite("d1", 1)).unwrap(),
                EntityMention::new("B", "d1", cite("d1", 1)).unwrap(),
            ],
            amounts: (1..=10)
                .map(|i| {
                    Amount::new(Decimal::from(i * 1_000), "ledger", cite("ledger", 2)).unwrap()
                })
                .collect(),
            dates: vec![date("2005-01-10", 1), date("2005-03-01", 2)],
            rejected: Vec::new(),
        }
    }

    #[test]
    fn failed_detector_leaves_the_others_intact() {
        let report = run_all_with(
            &mixed_facts(),
            &AnalysisConfig::default(),
            &Detector::ALL,
            failing_bridges,
        );

        assert!(report.has_failures());
        match &report.detectors[0].status {
            DetectorStatus::Failed { code, error } => {
                assert_eq!(*code, ErrorCode::CentralityFailure);
                assert!(error.contains("courier"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(report.graph.is_none());
        assert!(report.cooccurrence.is_none());
        assert!(report.ranking.is_empty());

        let kinds: Vec<FindingKind> = report.findings.iter().map(Finding::kind).collect();
        assert!(kinds.contains(&FindingKind::RoundNumberAnomaly));
        assert!(kinds.contains(&FindingKind::SilenceInterval));
        assert!(!kinds.contains(&FindingKind::BridgeEntity));
        assert!(matches!(report.detectors[1].status, DetectorStatus::Completed { findings } if findings > 0));
        assert!(matches!(report.detectors[2].status, DetectorStatus::Completed { findings: 1 }));
    }

    #[test]
    fn failure_status_serializes_with_code() {
        let summary = DetectorSummary {
            detector: Detector::Bridges,
            status: DetectorStatus::Failed {
                code: ErrorCode::CentralityFailure,
                error: "boom".into(),
            },
        };
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["detector"], "bridges");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["code"], "E4001");
    }
}
