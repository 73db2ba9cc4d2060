//! Extracted facts: entity mentions, amounts, and dates.
//!
//! Every fact carries the `document_id` it was extracted from plus the
//! [`Citation`] of the page it came from. Constructors validate the fact at
//! the boundary so detectors only ever see well-formed values; a failed
//! constructor yields a [`FactError`] that callers surface as a rejected
//! record instead of aborting the run.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::citation::Citation;
use crate::error::ErrorCode;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Input-validation failures for a single fact.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactError {
    /// The entity name is empty once whitespace is removed.
    #[error("entity name is empty after trimming")]
    EmptyEntityName,

    /// Amounts must be strictly positive.
    #[error("amount {value} is not positive")]
    NonPositiveAmount { value: Decimal },

    /// The amount text is not an exact decimal literal.
    #[error("amount {raw:?} is not an exact decimal")]
    MalformedAmount { raw: String },

    /// The date is not a resolved `YYYY-MM-DD` calendar date.
    #[error("date {raw:?} is not a resolved YYYY-MM-DD calendar date")]
    MalformedDate { raw: String },

    /// The fact claims a different document than its citation.
    #[error("fact references document {fact:?} but its citation points at {citation:?}")]
    DocumentMismatch { fact: String, citation: String },
}

impl FactError {
    /// Machine-readable code for this rejection.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyEntityName => ErrorCode::EmptyEntityName,
            Self::NonPositiveAmount { .. } => ErrorCode::NonPositiveAmount,
            Self::MalformedAmount { .. } => ErrorCode::MalformedAmount,
            Self::MalformedDate { .. } => ErrorCode::MalformedDate,
            Self::DocumentMismatch { .. } => ErrorCode::DocumentMismatch,
        }
    }
}

fn check_document(document_id: &str, citation: &Citation) -> Result<(), FactError> {
    if document_id == citation.document_id {
        Ok(())
    } else {
        Err(FactError::DocumentMismatch {
            fact: document_id.to_string(),
            citation: citation.document_id.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Entity mentions
// ---------------------------------------------------------------------------

/// Canonical form of an entity name: trimmed, internal whitespace collapsed
/// to single spaces, lowercased.
///
/// Returns `None` when nothing is left. No coreference: "John Smith" and
/// "Smith" stay separate nodes.
#[must_use]
pub fn canonicalize_entity(name: &str) -> Option<String> {
    let folded = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    if folded.is_empty() { None } else { Some(folded) }
}

/// One occurrence of a named entity in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Canonical entity name (see [`canonicalize_entity`]).
    pub entity_name: String,
    pub document_id: String,
    pub citation: Citation,
}

impl EntityMention {
    /// Build a mention, canonicalizing the name.
    ///
    /// # Errors
    ///
    /// [`FactError::EmptyEntityName`] for blank names and
    /// [`FactError::DocumentMismatch`] when `document_id` disagrees with the
    /// citation.
    pub fn new(
        entity_name: &str,
        document_id: impl Into<String>,
        citation: Citation,
    ) -> Result<Self, FactError> {
        let document_id = document_id.into();
        check_document(&document_id, &citation)?;
        let entity_name = canonicalize_entity(entity_name).ok_or(FactError::EmptyEntityName)?;
        Ok(Self {
            entity_name,
            document_id,
            citation,
        })
    }
}

/// The entity names of one document, each with the pages it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentEntities {
    pub document_id: String,
    /// Entity names as delivered, keyed to their own page citations; the
    /// builder canonicalizes and dedups the names.
    pub entities: BTreeMap<String, BTreeSet<Citation>>,
}

impl DocumentEntities {
    /// Every name cited on the same single page.
    #[must_use]
    pub fn new(citation: Citation, entities: Vec<String>) -> Self {
        let document_id = citation.document_id.clone();
        let entities = entities
            .into_iter()
            .map(|name| (name, BTreeSet::from([citation.clone()])))
            .collect();
        Self { document_id, entities }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }
}

/// Group mentions by document, preserving first-seen document order.
#[must_use]
pub fn group_mentions(mentions: &[EntityMention]) -> Vec<DocumentEntities> {
    let mut order: Vec<DocumentEntities> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for mention in mentions {
        let slot = *index.entry(mention.document_id.as_str()).or_insert_with(|| {
            order.push(DocumentEntities {
                document_id: mention.document_id.clone(),
                entities: BTreeMap::new(),
            });
            order.len() - 1
        });
        order[slot]
            .entities
            .entry(mention.entity_name.clone())
            .or_default()
            .insert(mention.citation.clone());
    }
    order
}

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// A currency amount extracted from a document, held as an exact decimal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: Decimal,
    pub document_id: String,
    pub citation: Citation,
}

/// Parse an amount literal as an exact decimal.
///
/// Literals that cannot be represented without rounding are rejected.
///
/// # Errors
///
/// [`FactError::MalformedAmount`] if `raw` is not a plain decimal literal.
pub fn parse_amount(raw: &str) -> Result<Decimal, FactError> {
    Decimal::from_str_exact(raw.trim()).map_err(|_| FactError::MalformedAmount {
        raw: raw.to_string(),
    })
}

impl Amount {
    /// # Errors
    ///
    /// [`FactError::NonPositiveAmount`] for zero or negative values and
    /// [`FactError::DocumentMismatch`] for a citation from another document.
    pub fn new(
        value: Decimal,
        document_id: impl Into<String>,
        citation: Citation,
    ) -> Result<Self, FactError> {
        let document_id = document_id.into();
        check_document(&document_id, &citation)?;
        if value <= Decimal::ZERO {
            return Err(FactError::NonPositiveAmount { value });
        }
        Ok(Self {
            value,
            document_id,
            citation,
        })
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// A resolved calendar date extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFact {
    pub date: NaiveDate,
    pub document_id: String,
    pub citation: Citation,
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// Anything else (two-digit years, `MM/DD` forms, missing zero padding) is
/// treated as unresolved and rejected rather than guessed.
///
/// # Errors
///
/// [`FactError::MalformedDate`] if `raw` is not a valid ISO calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, FactError> {
    let malformed = || FactError::MalformedDate {
        raw: raw.to_string(),
    };
    let bytes = raw.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(malformed());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| malformed())
}

impl DateFact {
    /// # Errors
    ///
    /// [`FactError::DocumentMismatch`] for a citation from another document.
    pub fn new(
        date: NaiveDate,
        document_id: impl Into<String>,
        citation: Citation,
    ) -> Result<Self, FactError> {
        let document_id = document_id.into();
        check_document(&document_id, &citation)?;
        Ok(Self {
            date,
            document_id,
            citation,
        })
    }
}
