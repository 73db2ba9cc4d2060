//! Benford's-Law goodness-of-fit test.
//!
//! Expected leading-digit probability is `P(d) = log10(1 + 1/d)`. The test
//! statistic is Pearson's chi-square over the nine buckets (df = 8); the
//! group is in violation when the statistic exceeds the configured critical
//! value.

use fathom_core::config::DigitConfig;
use serde::Serialize;

/// Degrees of freedom for nine leading-digit buckets.
pub const DEGREES_OF_FREEDOM: u32 = 8;

/// Expected proportion of leading digit `d` (1..=9).
#[must_use]
pub fn benford_probability(d: u8) -> f64 {
    (1.0 + 1.0 / f64::from(d)).log10()
}

/// Result of a completed test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenfordTest {
    pub chi_square: f64,
    /// Upper-tail probability of `chi_square` at df = 8.
    pub p_value: f64,
    pub threshold: f64,
    pub violation: bool,
    /// Expected counts for digits 1 through 9.
    pub expected: [f64; 9],
    /// `(observed - expected) / expected` per digit.
    pub deviations: [f64; 9],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BenfordOutcome {
    /// Not enough amounts to test.
    Skipped { required: usize, actual: usize },
    Tested(BenfordTest),
}

impl BenfordOutcome {
    #[must_use]
    pub const fn test(&self) -> Option<&BenfordTest> {
        match self {
            Self::Tested(t) => Some(t),
            Self::Skipped { .. } => None,
        }
    }

    #[must_use]
    pub fn is_violation(&self) -> bool {
        self.test().is_some_and(|t| t.violation)
    }
}

/// Run the test on a leading-digit histogram (index 0 is digit 1).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn benford_test(counts: &[usize; 9], config: &DigitConfig) -> BenfordOutcome {
    let total: usize = counts.iter().sum();
    if total < config.min_sample_size {
        return BenfordOutcome::Skipped {
            required: config.min_sample_size,
            actual: total,
        };
    }

    let n = total as f64;
    let mut expected = [0.0; 9];
    let mut deviations = [0.0; 9];
    let mut chi_square = 0.0;

    for (i, &observed) in counts.iter().enumerate() {
        let digit = u8::try_from(i + 1).unwrap_or(9);
        let e = n * benford_probability(digit);
        let o = observed as f64;
        expected[i] = e;
        deviations[i] = (o - e) / e;
        chi_square += (o - e).powi(2) / e;
    }

    BenfordOutcome::Tested(BenfordTest {
        chi_square,
        p_value: chi_square_survival(chi_square, DEGREES_OF_FREEDOM),
        threshold: config.chi_square_threshold,
        violation: chi_square > config.chi_square_threshold,
        expected,
        deviations,
    })
}

/// Upper-tail probability `P(X > x)` for a chi-square variable with an even
/// number of degrees of freedom `k`:
///
/// `Q = e^(-x/2) * sum_{i=0}^{k/2-1} (x/2)^i / i!`
///
/// Odd `k` is rounded up to the next even value.
#[must_use]
pub fn chi_square_survival(x: f64, k: u32) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    let half = x / 2.0;
    let terms = k.div_ceil(2);
    let mut term = 1.0;
    let mut sum = 0.0;
    for i in 0..terms {
        if i > 0 {
            term *= half / f64::from(i);
        }
        sum += term;
    }
    ((-half).exp() * sum).clamp(0.0, 1.0)
}
