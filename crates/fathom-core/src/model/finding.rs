//! Findings: the authoritative output of a run.
//!
//! A [`Finding`] can only be obtained through [`Finding::try_new`] (or by
//! deserializing, which runs the same checks), so every finding in memory
//! satisfies the contract: non-empty sorted citations, a metrics payload
//! and subject that match the kind, and a severity the kind allows.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::citation::Citation;
use crate::error::ErrorCode;

// ---------------------------------------------------------------------------
// Closed enumerations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    BridgeEntity,
    BenfordsViolation,
    RoundNumberAnomaly,
    SilenceInterval,
}

impl FindingKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BridgeEntity => "bridge_entity",
            Self::BenfordsViolation => "benfords_violation",
            Self::RoundNumberAnomaly => "round_number_anomaly",
            Self::SilenceInterval => "silence_interval",
        }
    }

    /// Severity a detector assigns when it has no reason to deviate.
    #[must_use]
    pub const fn default_severity(self) -> Severity {
        match self {
            Self::BridgeEntity | Self::BenfordsViolation | Self::RoundNumberAnomaly => {
                Severity::High
            }
            Self::SilenceInterval => Severity::Medium,
        }
    }

    /// Absence of evidence never rises above `medium`; structural and
    /// statistical findings never drop below it.
    #[must_use]
    pub const fn allows(self, severity: Severity) -> bool {
        match self {
            Self::SilenceInterval => matches!(severity, Severity::Low | Severity::Medium),
            Self::BridgeEntity | Self::BenfordsViolation | Self::RoundNumberAnomaly => {
                !matches!(severity, Severity::Low)
            }
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finding is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Subject {
    /// A canonical entity name.
    Entity(String),
    /// A single source document.
    Document(String),
    /// The whole corpus analyzed in this run.
    Corpus,
    /// A span of calendar time.
    DateRange { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(name) => write!(f, "entity {name}"),
            Self::Document(id) => write!(f, "document {id}"),
            Self::Corpus => f.write_str("corpus"),
            Self::DateRange { start, end } => write!(f, "{start}..{end}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeMetrics {
    /// Normalized betweenness centrality in `[0, 1]`.
    pub centrality: f64,
    /// Number of distinct neighbors.
    pub degree: usize,
    /// Distinct documents the entity co-occurs in.
    pub document_count: usize,
    /// `true` when centrality came from pivot sampling rather than exact Brandes.
    pub sampled: bool,
}

/// How many amounts in a group were divisible by one round-number divisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisorCount {
    pub divisor: Decimal,
    pub count: usize,
}

/// Digit-distribution evidence shared by Benford and round-number findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitMetrics {
    pub sample_size: usize,
    /// Counts of leading digits 1 through 9.
    pub leading_digit_counts: [usize; 9],
    /// `None` when the Benford test was skipped for lack of data.
    pub chi_square: Option<f64>,
    pub p_value: Option<f64>,
    pub chi_square_threshold: f64,
    pub round_count: usize,
    pub round_fraction: Decimal,
    pub round_fraction_threshold: Decimal,
    pub divisor_counts: Vec<DivisorCount>,
    /// Sample was tested but is small enough that the result is shaky.
    pub low_confidence: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilenceMetrics {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub gap_days: i64,
}

/// Kind-specific numeric payload of a finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Metrics {
    Bridge(BridgeMetrics),
    DigitDistribution(DigitMetrics),
    Silence(SilenceMetrics),
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// Violations of the finding contract. These indicate detector bugs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error("{kind} finding for {subject} has no citations")]
    MissingCitations { kind: FindingKind, subject: String },

    #[error("{kind} finding carries {shape} metrics")]
    MetricsMismatch { kind: FindingKind, shape: &'static str },

    #[error("{kind} finding cannot be about {subject}")]
    SubjectMismatch { kind: FindingKind, subject: String },

    #[error("{kind} finding cannot have severity {severity}")]
    SeverityNotAllowed { kind: FindingKind, severity: Severity },
}

impl EmitError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::MissingCitations { .. } => ErrorCode::MissingCitation,
            Self::MetricsMismatch { .. }
            | Self::SubjectMismatch { .. }
            | Self::SeverityNotAllowed { .. } => ErrorCode::FindingShapeMismatch,
        }
    }
}

/// A single detector result, ready for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FindingRecord")]
pub struct Finding {
    kind: FindingKind,
    severity: Severity,
    subject: Subject,
    metrics: Metrics,
    citations: Vec<Citation>,
}

/// Unchecked wire form of a [`Finding`].
#[derive(Deserialize)]
struct FindingRecord {
    kind: FindingKind,
    severity: Severity,
    subject: Subject,
    metrics: Metrics,
    citations: Vec<Citation>,
}

impl TryFrom<FindingRecord> for Finding {
    type Error = EmitError;

    fn try_from(r: FindingRecord) -> Result<Self, Self::Error> {
        Self::try_new(r.kind, r.severity, r.subject, r.metrics, r.citations)
    }
}

impl Finding {
    /// Build a finding, enforcing the output contract.
    ///
    /// Citations are sorted and deduplicated.
    ///
    /// # Errors
    ///
    /// Returns an [`EmitError`] when citations are empty, or when the
    /// subject, metrics, or severity do not fit `kind`.
    pub fn try_new(
        kind: FindingKind,
        severity: Severity,
        subject: Subject,
        metrics: Metrics,
        mut citations: Vec<Citation>,
    ) -> Result<Self, EmitError> {
        if citations.is_empty() {
            return Err(EmitError::MissingCitations {
                kind,
                subject: subject.to_string(),
            });
        }

        let metrics_ok = matches!(
            (kind, &metrics),
            (FindingKind::BridgeEntity, Metrics::Bridge(_))
                | (
                    FindingKind::BenfordsViolation | FindingKind::RoundNumberAnomaly,
                    Metrics::DigitDistribution(_)
                )
                | (FindingKind::SilenceInterval, Metrics::Silence(_))
        );
        if !metrics_ok {
            return Err(EmitError::MetricsMismatch {
                kind,
                shape: metrics.shape(),
            });
        }

        let subject_ok = matches!(
            (kind, &subject),
            (FindingKind::BridgeEntity, Subject::Entity(_))
                | (
                    FindingKind::BenfordsViolation | FindingKind::RoundNumberAnomaly,
                    Subject::Document(_) | Subject::Corpus
                )
                | (FindingKind::SilenceInterval, Subject::DateRange { .. })
        );
        if !subject_ok {
            return Err(EmitError::SubjectMismatch {
                kind,
                subject: subject.to_string(),
            });
        }

        if !kind.allows(severity) {
            return Err(EmitError::SeverityNotAllowed { kind, severity });
        }

        citations.sort();
        citations.dedup();

        Ok(Self {
            kind,
            severity,
            subject,
            metrics,
            citations,
        })
    }

    #[must_use]
    pub const fn kind(&self) -> FindingKind {
        self.kind
    }

    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub const fn subject(&self) -> &Subject {
        &self.subject
    }

    #[must_use]
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

impl Metrics {
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Bridge(_) => "bridge",
            Self::DigitDistribution(_) => "digit_distribution",
            Self::Silence(_) => "silence",
        }
    }
}
