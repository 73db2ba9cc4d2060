use std::fmt;

use serde::{Deserialize, Serialize};

/// Provenance of an extracted fact: which document, which file, which page.
///
/// Citations are attached once at extraction time and shared by every fact
/// extracted from the same page. The derived ordering compares fields in
/// declaration order, which keeps citation sets deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Citation {
    /// Stable identifier of the source document.
    pub document_id: String,
    /// Content hash of the source document (as computed by ingestion).
    pub document_hash: String,
    /// Original filename of the source document.
    pub filename: String,
    /// 1-based page number within the document.
    pub page_number: u32,
}

impl Citation {
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        document_hash: impl Into<String>,
        filename: impl Into<String>,
        page_number: u32,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            document_hash: document_hash.into(),
            filename: filename.into(),
            page_number,
        }
    }

    /// First 12 characters of the document hash, for compact display.
    #[must_use]
    pub fn short_hash(&self) -> &str {
        let end = self
            .document_hash
            .char_indices()
            .nth(12)
            .map_or(self.document_hash.len(), |(i, _)| i);
        &self.document_hash[..end]
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} p.{} [{}]",
            self.filename,
            self.page_number,
            self.short_hash()
        )
    }
}
