use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "fathom.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::Invalid { .. } => ErrorCode::InvalidConfig,
        }
    }
}

/// Whether a value equal to a threshold counts as crossing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    Inclusive,
    Exclusive,
}

impl Boundary {
    /// `value >= threshold` when inclusive, `value > threshold` when exclusive.
    #[must_use]
    pub fn admits<T: PartialOrd>(self, value: &T, threshold: &T) -> bool {
        match self {
            Self::Inclusive => value >= threshold,
            Self::Exclusive => value > threshold,
        }
    }
}

/// Unit over which amounts are pooled for the digit tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountGrouping {
    Corpus,
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub digits: DigitConfig,
    #[serde(default)]
    pub silence: SilenceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Documents with more distinct entities than this are logged as
    /// suspicious extraction output (they are still processed).
    #[serde(default = "default_max_entities_per_document")]
    pub max_entities_per_document: usize,
    /// Documents per worker chunk in the parallel build.
    #[serde(default = "default_partition_size")]
    pub partition_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_entities_per_document: default_max_entities_per_document(),
            partition_size: default_partition_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_min_centrality")]
    pub min_centrality: f64,
    #[serde(default = "default_max_degree")]
    pub max_degree: usize,
    /// Graphs with more nodes than this use pivot-sampled centrality.
    #[serde(default = "default_exact_node_limit")]
    pub exact_node_limit: usize,
    #[serde(default = "default_sample_pivots")]
    pub sample_pivots: usize,
    #[serde(default = "default_sample_seed")]
    pub sample_seed: u64,
    /// Emit at most this many bridge findings (best ranked first).
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Length of the centrality ranking carried in the run report.
    #[serde(default = "default_ranking_size")]
    pub ranking_size: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            min_centrality: default_min_centrality(),
            max_degree: default_max_degree(),
            exact_node_limit: default_exact_node_limit(),
            sample_pivots: default_sample_pivots(),
            sample_seed: default_sample_seed(),
            max_results: None,
            ranking_size: default_ranking_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitConfig {
    #[serde(default = "default_min_sample_size")]
    pub min_sample_size: usize,
    /// Chi-square critical value at df = 8 (15.507 is p = 0.05).
    #[serde(default = "default_chi_square_threshold")]
    pub chi_square_threshold: f64,
    #[serde(default = "default_round_number_divisors")]
    pub round_number_divisors: Vec<u64>,
    #[serde(default = "default_round_number_fraction_threshold")]
    pub round_number_fraction_threshold: Decimal,
    #[serde(default = "default_round_number_boundary")]
    pub round_number_boundary: Boundary,
    /// Round-number results on smaller samples are marked low confidence.
    #[serde(default = "default_min_sample_size")]
    pub min_confident_sample: usize,
    #[serde(default = "default_groupings")]
    pub groupings: Vec<AmountGrouping>,
}

impl Default for DigitConfig {
    fn default() -> Self {
        Self {
            min_sample_size: default_min_sample_size(),
            chi_square_threshold: default_chi_square_threshold(),
            round_number_divisors: default_round_number_divisors(),
            round_number_fraction_threshold: default_round_number_fraction_threshold(),
            round_number_boundary: default_round_number_boundary(),
            min_confident_sample: default_min_sample_size(),
            groupings: default_groupings(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SilenceConfig {
    #[serde(default = "default_min_gap_days")]
    pub min_gap_days: i64,
    #[serde(default = "default_silence_boundary")]
    pub boundary: Boundary,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            min_gap_days: default_min_gap_days(),
            boundary: default_silence_boundary(),
        }
    }
}

impl AnalysisConfig {
    /// Reject values no detector can work with.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| Err(ConfigError::Invalid { field, reason });

        if self.graph.partition_size == 0 {
            return invalid("graph.partition_size", "must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.bridge.min_centrality) {
            return invalid(
                "bridge.min_centrality",
                format!("{} is outside [0, 1]", self.bridge.min_centrality),
            );
        }
        if self.bridge.sample_pivots == 0 {
            return invalid("bridge.sample_pivots", "must be at least 1".into());
        }
        if self.digits.min_sample_size == 0 {
            return invalid("digits.min_sample_size", "must be at least 1".into());
        }
        if !self.digits.chi_square_threshold.is_finite() || self.digits.chi_square_threshold <= 0.0 {
            return invalid(
                "digits.chi_square_threshold",
                format!("{} is not a positive number", self.digits.chi_square_threshold),
            );
        }
        if self.digits.round_number_divisors.is_empty() {
            return invalid("digits.round_number_divisors", "needs at least one divisor".into());
        }
        if self.digits.round_number_divisors.contains(&0) {
            return invalid("digits.round_number_divisors", "divisors must be positive".into());
        }
        let fraction = self.digits.round_number_fraction_threshold;
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return invalid(
                "digits.round_number_fraction_threshold",
                format!("{fraction} is outside [0, 1]"),
            );
        }
        if self.digits.groupings.is_empty() {
            return invalid("digits.groupings", "needs at least one grouping".into());
        }
        if self.silence.min_gap_days < 1 {
            return invalid(
                "silence.min_gap_days",
                format!("{} must be at least 1", self.silence.min_gap_days),
            );
        }
        Ok(())
    }
}

/// Load and validate a config file.
///
/// # Errors
///
/// Read, parse, or validation failure.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str::<AnalysisConfig>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Resolve the effective config: an explicit path wins, then
/// `fathom.toml` in `working_dir`, then defaults.
///
/// # Errors
///
/// A missing explicit path is an error; a missing implicit file is not.
pub fn resolve_config(
    explicit: Option<&Path>,
    working_dir: &Path,
) -> Result<AnalysisConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let implicit = working_dir.join(CONFIG_FILE_NAME);
    if implicit.exists() {
        tracing::debug!(path = %implicit.display(), "loading config");
        return load_config(&implicit);
    }
    Ok(AnalysisConfig::default())
}

const fn default_max_entities_per_document() -> usize {
    200
}

const fn default_partition_size() -> usize {
    256
}

const fn default_min_centrality() -> f64 {
    0.1
}

const fn default_max_degree() -> usize {
    5
}

const fn default_exact_node_limit() -> usize {
    5_000
}

const fn default_sample_pivots() -> usize {
    512
}

const fn default_sample_seed() -> u64 {
    0x5EED
}

const fn default_ranking_size() -> usize {
    50
}

const fn default_min_sample_size() -> usize {
    30
}

const fn default_chi_square_threshold() -> f64 {
    15.507
}

fn default_round_number_divisors() -> Vec<u64> {
    vec![1_000, 10_000]
}

const fn default_round_number_fraction_threshold() -> Decimal {
    Decimal::from_parts(30, 0, 0, false, 2)
}

const fn default_round_number_boundary() -> Boundary {
    Boundary::Inclusive
}

fn default_groupings() -> Vec<AmountGrouping> {
    vec![AmountGrouping::Corpus, AmountGrouping::Document]
}

const fn default_min_gap_days() -> i64 {
    20
}

const fn default_silence_boundary() -> Boundary {
    Boundary::Exclusive
}
