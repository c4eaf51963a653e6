//! Search input and publication output types.
//!
//! [`SearchRequest`] is built once per invocation and only read afterwards.
//! [`PublicationRecord`] is the flat row every provider item is normalized into.

use crate::error::{LitSearchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default result cap when none is given
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Document types offered by the front ends (provider vocabulary)
pub const DOCUMENT_TYPES: &[&str] = &[
    "article",
    "book",
    "book-chapter",
    "dissertation",
    "journal",
    "proceedings",
    "report",
];

/// Column order for every export
pub const RECORD_COLUMNS: &[&str] = &[
    "Title",
    "Authors",
    "Year",
    "Source",
    "DocumentType",
    "CitationCount",
    "AccessStatus",
    "Identifier",
];

/// Which access model a result must have
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// No restriction
    #[default]
    Any,
    /// Freely readable only
    #[value(name = "open")]
    OpenOnly,
    /// Subscription/paywalled only
    #[value(name = "paid")]
    PaidOnly,
}

/// A single sort criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    /// Newest first
    Recency,
    /// Provider relevance score
    Relevance,
    /// Most cited first
    #[value(name = "citations")]
    CitationCount,
}

/// Up to two sort criteria, applied in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortPriority {
    pub primary: SortCriterion,
    #[serde(default)]
    pub secondary: Option<SortCriterion>,
}

impl SortPriority {
    pub fn new(primary: SortCriterion, secondary: Option<SortCriterion>) -> Self {
        Self { primary, secondary }
    }

    /// Active criteria, primary first
    pub fn criteria(&self) -> impl Iterator<Item = SortCriterion> {
        std::iter::once(self.primary).chain(self.secondary)
    }
}

impl Default for SortPriority {
    fn default() -> Self {
        Self {
            primary: SortCriterion::Recency,
            secondary: None,
        }
    }
}

/// User-supplied search parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text search keywords
    pub keywords: String,
    /// Earliest publication year (inclusive)
    #[serde(default)]
    pub start_year: Option<i32>,
    /// Latest publication year (inclusive)
    #[serde(default)]
    pub end_year: Option<i32>,
    /// Requested document types; empty means any
    #[serde(default)]
    pub document_types: Vec<String>,
    #[serde(default)]
    pub access: AccessPolicy,
    #[serde(default)]
    pub sort: SortPriority,
    /// Upper bound on returned records
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl SearchRequest {
    /// Create a request with default filters
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            start_year: None,
            end_year: None,
            document_types: Vec::new(),
            access: AccessPolicy::Any,
            sort: SortPriority::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_years(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }

    /// Set document types, dropping duplicates while keeping first occurrence order
    pub fn with_document_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for t in types {
            let t = t.into();
            if !unique.contains(&t) {
                unique.push(t);
            }
        }
        self.document_types = unique;
        self
    }

    pub fn with_access(mut self, access: AccessPolicy) -> Self {
        self.access = access;
        self
    }

    pub fn with_sort(mut self, primary: SortCriterion, secondary: Option<SortCriterion>) -> Self {
        self.sort = SortPriority::new(primary, secondary);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Reject requests the pipeline cannot run
    pub fn validate(&self) -> Result<()> {
        if self.keywords.trim().is_empty() {
            return Err(LitSearchError::Validation(
                "search keywords must not be empty".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(LitSearchError::Validation(
                "max_results must be at least 1".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_year, self.end_year) {
            if start > end {
                return Err(LitSearchError::Validation(format!(
                    "start year {} is after end year {}",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

/// Whether a publication is freely readable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessStatus {
    Open,
    Paid,
}

impl From<bool> for AccessStatus {
    fn from(is_oa: bool) -> Self {
        if is_oa {
            AccessStatus::Open
        } else {
            AccessStatus::Paid
        }
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessStatus::Open => f.pad("Open"),
            AccessStatus::Paid => f.pad("Paid"),
        }
    }
}

/// One normalized output row. Field order matches [`RECORD_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Authors")]
    pub authors: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "DocumentType")]
    pub document_type: String,
    #[serde(rename = "CitationCount")]
    pub citation_count: u64,
    #[serde(rename = "AccessStatus")]
    pub access_status: AccessStatus,
    #[serde(rename = "Identifier")]
    pub identifier: String,
}
