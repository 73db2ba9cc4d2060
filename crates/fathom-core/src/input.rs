//! Wire format delivered by the extraction stage, and boundary validation.
//!
//! A [`FactBundle`] is the unvalidated JSON document the extractor writes.
//! [`FactBundle::validate`] turns it into typed facts; records that fail
//! validation are collected as [`RejectedRecord`]s instead of aborting.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::model::{
    Amount, Citation, DateFact, EntityMention, FactError, parse_amount, parse_date,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactBundle {
    #[serde(default)]
    pub mentions: Vec<RawMention>,
    #[serde(default)]
    pub amounts: Vec<RawAmount>,
    #[serde(default)]
    pub dates: Vec<RawDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMention {
    pub entity_name: String,
    pub document_id: String,
    pub citation: Citation,
}

/// Amount as written by the extractor.
///
/// String literals are parsed exactly. Bare JSON numbers pass through the
/// JSON parser's float representation first, so extractors should prefer
/// strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountLiteral {
    Text(String),
    Number(serde_json::Number),
}

impl AmountLiteral {
    fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAmount {
    pub value: AmountLiteral,
    pub document_id: String,
    pub citation: Citation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDate {
    pub date: String,
    pub document_id: String,
    pub citation: Citation,
}

/// Which list of the bundle a rejected record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactList {
    Mentions,
    Amounts,
    Dates,
}

impl FactList {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mentions => "mentions",
            Self::Amounts => "amounts",
            Self::Dates => "dates",
        }
    }
}

/// A record dropped at the boundary, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    pub list: FactList,
    /// Position in the bundle list.
    pub index: usize,
    pub code: ErrorCode,
    pub reason: String,
}

impl RejectedRecord {
    fn new(list: FactList, index: usize, err: &FactError) -> Self {
        Self {
            list,
            index,
            code: err.code(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidatedFacts {
    pub mentions: Vec<EntityMention>,
    pub amounts: Vec<Amount>,
    pub dates: Vec<DateFact>,
    pub rejected: Vec<RejectedRecord>,
}

impl FactBundle {
    /// Parse a bundle from JSON.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the document does not match the schema.
    pub fn from_reader(reader: impl Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Validate every record, keeping input order for accepted facts.
    #[must_use]
    pub fn validate(self) -> ValidatedFacts {
        let mut out = ValidatedFacts::default();

        for (index, raw) in self.mentions.into_iter().enumerate() {
            match EntityMention::new(&raw.entity_name, raw.document_id, raw.citation) {
                Ok(m) => out.mentions.push(m),
                Err(e) => out.rejected.push(RejectedRecord::new(FactList::Mentions, index, &e)),
            }
        }

        for (index, raw) in self.amounts.into_iter().enumerate() {
            let parsed = parse_amount(&raw.value.as_text())
                .and_then(|value| Amount::new(value, raw.document_id, raw.citation));
            match parsed {
                Ok(a) => out.amounts.push(a),
                Err(e) => out.rejected.push(RejectedRecord::new(FactList::Amounts, index, &e)),
            }
        }

        for (index, raw) in self.dates.into_iter().enumerate() {
            let parsed = parse_date(&raw.date)
                .and_then(|date| DateFact::new(date, raw.document_id, raw.citation));
            match parsed {
                Ok(d) => out.dates.push(d),
                Err(e) => out.rejected.push(RejectedRecord::new(FactList::Dates, index, &e)),
            }
        }

        for r in &out.rejected {
            debug!(list = ?r.list, index = r.index, code = %r.code, reason = %r.reason, "rejected record");
        }
        if !out.rejected.is_empty() {
            warn!(
                rejected = out.rejected.len(),
                mentions = out.mentions.len(),
                amounts = out.amounts.len(),
                dates = out.dates.len(),
                "some fact records failed validation and were skipped"
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const BUNDLE: &str = r#"{
        "mentions": [
            {"entity_name": "Alice Smith", "document_id": "d1",
             "citation": {"document_id": "d1", "document_hash": "aa", "filename": "d1.pdf", "page_number": 1}},
            {"entity_name": "   ", "document_id": "d1",
             "citation": {"document_id": "d1", "document_hash": "aa", "filename": "d1.pdf", "page_number": 1}}
        ],
        "amounts": [
            {"value": "1250.10", "document_id": "d1",
             "citation": {"document_id": "d1", "document_hash": "aa", "filename": "d1.pdf", "page_number": 2}},
            {"value": 5000, "document_id": "d1",
             "citation": {"document_id": "d1", "document_hash": "aa", "filename": "d1.pdf", "page_number": 2}},
            {"value": "-3", "document_id": "d1",
             "citation": {"document_id": "d1", "document_hash": "aa", "filename": "d1.pdf", "page_number": 2}},
            {"value": "12 dollars", "document_id": "d1",
             "citation": {"document_id": "d1", "document_hash": "aa", "filename": "d1.pdf", "page_number": 2}}
        ],
        "dates": [
            {"date": "2005-01-10", "document_id": "d1",
             "citation": {"document_id": "d1", "document_hash": "aa", "filename": "d1.pdf", "page_number": 3}},
            {"date": "01/10/2005", "document_id": "d1",
             "citation": {"document_id": "d1", "document_hash": "aa", "filename": "d1.pdf", "page_number": 3}},
            {"date": "2005-01-11", "document_id": "d2",
             "citation": {"document_id": "d1", "document_hash": "aa", "filename": "d1.pdf", "page_number": 3}}
        ]
    }"#;

    #[test]
    fn bundle_validation_splits_good_and_bad_records() {
        let bundle = FactBundle::from_reader(BUNDLE.as_bytes()).expect("parse bundle");
        let facts = bundle.validate();

        assert_eq!(facts.mentions.len(), 1);
        assert_eq!(facts.mentions[0].entity_name, "alice smith");

        assert_eq!(facts.amounts.len(), 2);
        assert_eq!(facts.amounts[0].value, Decimal::from_str("1250.10").unwrap());
        assert_eq!(facts.amounts[1].value, Decimal::from(5000));

        assert_eq!(facts.dates.len(), 1);

        let codes: Vec<(FactList, usize, ErrorCode)> = facts
            .rejected
            .iter()
            .map(|r| (r.list, r.index, r.code))
            .collect();
        assert_eq!(
            codes,
            vec![
                (FactList::Mentions, 1, ErrorCode::EmptyEntityName),
                (FactList::Amounts, 2, ErrorCode::NonPositiveAmount),
                (FactList::Amounts, 3, ErrorCode::MalformedAmount),
                (FactList::Dates, 1, ErrorCode::MalformedDate),
                (FactList::Dates, 2, ErrorCode::DocumentMismatch),
            ]
        );
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let bundle = FactBundle::from_reader(&b"{}"[..]).expect("parse bundle");
        let facts = bundle.validate();
        assert!(facts.mentions.is_empty());
        assert!(facts.amounts.is_empty());
        assert!(facts.dates.is_empty());
        assert!(facts.rejected.is_empty());
    }
}
