//! Round-number frequency test.
//!
//! Fabricated or negotiated figures cluster on round values. An amount is
//! round when it is an integer divisible by any configured divisor; the
//! group is flagged when the round fraction reaches the threshold.
//! Everything is exact decimal arithmetic, including the threshold compare.

use fathom_core::config::DigitConfig;
use fathom_core::model::DivisorCount;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTest {
    pub sample_size: usize,
    pub round_count: usize,
    /// `round_count / sample_size`.
    pub round_fraction: Decimal,
    pub threshold: Decimal,
    /// Per-divisor counts, in configured order. An amount may count under
    /// several divisors.
    pub divisor_counts: Vec<DivisorCount>,
    pub flagged: bool,
    /// Sample below `min_confident_sample`.
    pub low_confidence: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoundOutcome {
    /// No amounts in the group.
    Skipped,
    Tested(RoundTest),
}

impl RoundOutcome {
    #[must_use]
    pub const fn test(&self) -> Option<&RoundTest> {
        match self {
            Self::Tested(t) => Some(t),
            Self::Skipped => None,
        }
    }

    #[must_use]
    pub fn is_flagged(&self) -> bool {
        self.test().is_some_and(|t| t.flagged)
    }
}

/// Integer value divisible by `divisor`.
#[must_use]
pub fn divisible_by(value: Decimal, divisor: Decimal) -> bool {
    !divisor.is_zero() && value.fract().is_zero() && (value % divisor).is_zero()
}

/// Run the test over a group's amounts.
#[must_use]
pub fn round_number_test(values: &[Decimal], config: &DigitConfig) -> RoundOutcome {
    if values.is_empty() {
        return RoundOutcome::Skipped;
    }

    let divisors: Vec<Decimal> = config
        .round_number_divisors
        .iter()
        .map(|&d| Decimal::from(d))
        .collect();

    let mut per_divisor = vec![0usize; divisors.len()];
    let mut round_count = 0usize;
    for &value in values {
        let mut round = false;
        for (slot, &divisor) in per_divisor.iter_mut().zip(&divisors) {
            if divisible_by(value, divisor) {
                *slot += 1;
                round = true;
            }
        }
        if round {
            round_count += 1;
        }
    }

    let total = values.len();
    let round_dec = Decimal::from(round_count);
    let total_dec = Decimal::from(total);
    let threshold = config.round_number_fraction_threshold;
    // Compare `round / total` against the threshold without dividing.
    let flagged = config
        .round_number_boundary
        .admits(&round_dec, &(threshold * total_dec));

    RoundOutcome::Tested(RoundTest {
        sample_size: total,
        round_count,
        round_fraction: (round_dec / total_dec).normalize(),
        threshold,
        divisor_counts: divisors
            .into_iter()
            .zip(per_divisor)
            .map(|(divisor, count)| DivisorCount { divisor, count })
            .collect(),
        flagged,
        low_confidence: total < config.min_confident_sample,
    })
}
