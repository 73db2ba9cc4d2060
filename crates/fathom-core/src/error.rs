use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorCode {
    ConfigParseError,
    InvalidConfig,
    FactBundleUnreadable,
    EmptyEntityName,
    NonPositiveAmount,
    MalformedAmount,
    MalformedDate,
    DocumentMismatch,
    MissingCitation,
    FindingShapeMismatch,
    CentralityFailure,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::InvalidConfig => "E1002",
            Self::FactBundleUnreadable => "E1003",
            Self::EmptyEntityName => "E2001",
            Self::NonPositiveAmount => "E2002",
            Self::MalformedAmount => "E2003",
            Self::MalformedDate => "E2004",
            Self::DocumentMismatch => "E2005",
            Self::MissingCitation => "E3001",
            Self::FindingShapeMismatch => "E3002",
            Self::CentralityFailure => "E4001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::InvalidConfig => "Config value out of range",
            Self::FactBundleUnreadable => "Fact bundle could not be read",
            Self::EmptyEntityName => "Empty entity name",
            Self::NonPositiveAmount => "Amount is zero or negative",
            Self::MalformedAmount => "Amount is not an exact decimal",
            Self::MalformedDate => "Date is not a resolved calendar date",
            Self::DocumentMismatch => "Fact document does not match its citation",
            Self::MissingCitation => "Finding has no citations",
            Self::FindingShapeMismatch => "Finding metrics do not match its kind",
            Self::CentralityFailure => "Centrality computation failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in fathom.toml and retry."),
            Self::InvalidConfig => {
                Some("Check thresholds: fractions and centrality lie in [0, 1], sizes are positive.")
            }
            Self::FactBundleUnreadable => {
                Some("Regenerate the fact bundle with the extraction stage.")
            }
            Self::EmptyEntityName => None,
            Self::NonPositiveAmount => Some("Only positive amounts are analyzed; drop refunds upstream."),
            Self::MalformedAmount => Some("Emit amounts as plain decimal strings, e.g. \"1250.00\"."),
            Self::MalformedDate => {
                Some("Resolve ambiguous dates upstream and emit them as YYYY-MM-DD.")
            }
            Self::DocumentMismatch => {
                Some("Make the fact's document_id match the citation's document_id.")
            }
            Self::MissingCitation | Self::FindingShapeMismatch => {
                Some("This is a detector bug. Report it with the input bundle.")
            }
            Self::CentralityFailure => {
                Some("Enable pivot sampling (lower bridge.exact_node_limit) or cap entity sets upstream.")
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl serde::Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}
