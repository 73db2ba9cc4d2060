//! Digit-distribution analysis of currency amounts.
//!
//! Amounts are pooled into groups (the whole corpus, each document, or
//! both) and every group runs two independent tests:
//!
//! - [`benford`]: leading-digit goodness of fit against Benford's Law.
//! - [`round`]: frequency of round multiples of the configured divisors.
//!
//! All digit work happens on exact decimals. The leading digit is the first
//! significant digit of the decimal mantissa, so `0.05` leads with 5.

pub mod benford;
pub mod round;

use std::collections::BTreeMap;

use fathom_core::config::{AmountGrouping, DigitConfig};
use fathom_core::model::{Amount, Citation, Subject};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

pub use benford::{BenfordOutcome, BenfordTest, benford_test, chi_square_survival};
pub use round::{RoundOutcome, RoundTest, round_number_test};

/// First significant digit of a non-zero decimal.
#[must_use]
pub fn leading_digit(value: Decimal) -> Option<u8> {
    let mut m = value.mantissa().unsigned_abs();
    if m == 0 {
        return None;
    }
    while m >= 10 {
        m /= 10;
    }
    u8::try_from(m).ok()
}

/// Leading-digit histogram; index 0 is digit 1.
#[must_use]
pub fn leading_digit_counts(values: &[Decimal]) -> [usize; 9] {
    let mut counts = [0usize; 9];
    for d in values.iter().filter_map(|v| leading_digit(*v)) {
        counts[usize::from(d) - 1] += 1;
    }
    counts
}

/// Both test outcomes for one group of amounts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DigitReport {
    pub subject: Subject,
    pub sample_size: usize,
    pub leading_digit_counts: [usize; 9],
    pub benford: BenfordOutcome,
    pub round: RoundOutcome,
    /// Citations of every amount in the group, sorted and unique.
    #[serde(skip)]
    pub citations: Vec<Citation>,
}

/// Run both tests on one group.
#[must_use]
pub fn analyze_group(subject: Subject, amounts: &[&Amount], config: &DigitConfig) -> DigitReport {
    let values: Vec<Decimal> = amounts.iter().map(|a| a.value).collect();
    let counts = leading_digit_counts(&values);

    let mut citations: Vec<Citation> = amounts.iter().map(|a| a.citation.clone()).collect();
    citations.sort();
    citations.dedup();

    DigitReport {
        subject,
        sample_size: values.len(),
        leading_digit_counts: counts,
        benford: benford_test(&counts, config),
        round: round_number_test(&values, config),
        citations,
    }
}

/// Pool amounts per the configured groupings: corpus first, then documents
/// in id order. Empty groups are never produced.
#[must_use]
pub fn group_amounts<'a>(
    amounts: &'a [Amount],
    groupings: &[AmountGrouping],
) -> Vec<(Subject, Vec<&'a Amount>)> {
    let mut groups = Vec::new();
    if amounts.is_empty() {
        return groups;
    }

    if groupings.contains(&AmountGrouping::Corpus) {
        groups.push((Subject::Corpus, amounts.iter().collect()));
    }
    if groupings.contains(&AmountGrouping::Document) {
        let mut by_doc: BTreeMap<&str, Vec<&Amount>> = BTreeMap::new();
        for a in amounts {
            by_doc.entry(a.document_id.as_str()).or_default().push(a);
        }
        groups.extend(
            by_doc
                .into_iter()
                .map(|(doc, members)| (Subject::Document(doc.to_string()), members)),
        );
    }
    groups
}

/// Analyze every group, in parallel, preserving group order.
#[must_use]
#[instrument(skip_all, fields(amounts = amounts.len()))]
pub fn analyze_amounts(amounts: &[Amount], config: &DigitConfig) -> Vec<DigitReport> {
    let groups = group_amounts(amounts, &config.groupings);
    let reports: Vec<DigitReport> = groups
        .into_par_iter()
        .map(|(subject, members)| analyze_group(subject, &members, config))
        .collect();

    debug!(
        groups = reports.len(),
        benford_violations = reports.iter().filter(|r| r.benford.is_violation()).count(),
        round_flags = reports.iter().filter(|r| r.round.is_flagged()).count(),
        "digit analysis complete"
    );
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).expect("decimal")
    }

    fn amount(doc: &str, v: &str) -> Amount {
        Amount::new(dec(v), doc, Citation::new(doc, "h", format!("{doc}.pdf"), 1)).expect("amount")
    }

    #[test]
    fn leading_digit_uses_mantissa() {
        assert_eq!(leading_digit(dec("0.05")), Some(5));
        assert_eq!(leading_digit(dec("1250.10")), Some(1));
        assert_eq!(leading_digit(dec("9")), Some(9));
        assert_eq!(leading_digit(dec("0.000700")), Some(7));
        assert_eq!(leading_digit(Decimal::ZERO), None);
    }

    #[test]
    fn groups_corpus_then_documents_in_id_order() {
        let amounts = vec![amount("b", "10"), amount("a", "20"), amount("b", "30")];
        let groups = group_amounts(&amounts, &[AmountGrouping::Corpus, AmountGrouping::Document]);
        let subjects: Vec<&Subject> = groups.iter().map(|(s, _)| s).collect();
        assert_eq!(
            subjects,
            vec![
                &Subject::Corpus,
                &Subject::Document("a".into()),
                &Subject::Document("b".into())
            ]
        );
        assert_eq!(groups[0].1.len(), 3);
        assert_eq!(groups[2].1.len(), 2);
    }

    #[test]
    fn no_amounts_no_groups() {
        assert!(group_amounts(&[], &[AmountGrouping::Corpus]).is_empty());
    }

    #[test]
    fn small_document_group_is_skipped_for_benford() {
        let amounts = vec![amount("a", "1000"), amount("a", "2000")];
        let reports = analyze_amounts(
            &amounts,
            &DigitConfig {
                groupings: vec![AmountGrouping::Document],
                ..DigitConfig::default()
            },
        );
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].benford, BenfordOutcome::Skipped { actual: 2, .. }));
        assert!(reports[0].round.is_flagged());
        assert_eq!(reports[0].citations.len(), 1);
    }
}
