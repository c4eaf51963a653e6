//! Record normalizer: maps raw OpenAlex work objects onto [`PublicationRecord`].
//!
//! Every field is optional on the provider side. Only the year is mandatory;
//! all other gaps are filled with placeholders so one bad field never costs
//! the whole row.

use crate::model::{AccessStatus, PublicationRecord};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const NO_TITLE: &str = "No title available";
pub const NO_AUTHORS: &str = "No authors available";
pub const NO_SOURCE: &str = "No source available";
pub const NO_IDENTIFIER: &str = "No URL available";
pub const UNKNOWN_TYPE: &str = "unknown";

/// Smallest float magnitude rendered in exponent notation
const MAX_PLAIN_FLOAT: f64 = 1e16;

/// Why a raw item did not become a record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SkipReason {
    /// Year absent, null or zero; dropped without a warning
    #[error("publication has no year")]
    MissingYear,

    /// Year present but not convertible to a 4-digit year
    #[error("Invalid year format found: {0}, skipping")]
    InvalidYear(String),

    /// Item shape could not be read at all
    #[error("Error processing a publication: {0}")]
    Malformed(String),
}

impl SkipReason {
    /// Whether the skip should be surfaced to the user
    pub fn is_warning(&self) -> bool {
        !matches!(self, SkipReason::MissingYear)
    }
}

/// `publication_year` as the provider may render it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawYear {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for RawYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawYear::Integer(i) => write!(f, "{}", i),
            RawYear::Float(x) => write!(f, "{}", x),
            RawYear::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Normalize one raw provider item.
///
/// Only a non-object item or an unusable year skips the item. Any other field
/// with an unexpected JSON type is read as absent and gets its placeholder.
pub fn normalize_item(item: Value) -> Result<PublicationRecord, SkipReason> {
    let work = item
        .as_object()
        .ok_or_else(|| SkipReason::Malformed(format!("expected an object, got {}", item)))?;

    let year = match work.get("publication_year") {
        None | Some(Value::Null) => return Err(SkipReason::MissingYear),
        Some(raw) => {
            let raw: RawYear = serde_json::from_value(raw.clone())
                .map_err(|_| SkipReason::InvalidYear(raw.to_string()))?;
            normalize_year(&raw)?
        }
    };

    let authors = work
        .get("authorships")
        .and_then(Value::as_array)
        .map(|authorships| {
            authorships
                .iter()
                .filter_map(|a| text_at(a, "/author/display_name"))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    let authors = if authors.is_empty() {
        NO_AUTHORS.to_string()
    } else {
        authors.join(", ")
    };

    let source = text_at(&item, "/primary_location/source/display_name")
        .or_else(|| text_at(&item, "/host_venue/display_name"))
        .unwrap_or_else(|| NO_SOURCE.to_string());

    let identifier = text_at(&item, "/doi")
        .or_else(|| text_at(&item, "/url"))
        .unwrap_or_else(|| NO_IDENTIFIER.to_string());

    let is_oa = item
        .pointer("/open_access/is_oa")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(PublicationRecord {
        title: text_at(&item, "/title").unwrap_or_else(|| NO_TITLE.to_string()),
        authors,
        year,
        source,
        document_type: text_at(&item, "/type").unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
        citation_count: work.get("cited_by_count").map_or(0, citation_count),
        access_status: AccessStatus::from(is_oa),
        identifier,
    })
}

/// Non-blank string at a JSON pointer
fn text_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Integer or whole-number float; anything else counts as zero
fn citation_count(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => f as u64,
        _ => 0,
    }
}

/// Convert a provider year into a 4-digit year.
///
/// Some OpenAlex records carry the year as a decimal such as `2.015` for
/// 2015. For floats the separators are stripped from the rendered text and
/// the first four characters taken; shorter texts fall back to truncation.
/// Floats of 1e16 and above, which only exist in exponent notation, are
/// rejected, as are results outside 1000..=9999.
pub fn normalize_year(raw: &RawYear) -> Result<i32, SkipReason> {
    let invalid = || SkipReason::InvalidYear(raw.to_string());

    let year: i64 = match raw {
        RawYear::Integer(0) => return Err(SkipReason::MissingYear),
        RawYear::Integer(i) => *i,
        RawYear::Float(f) if *f == 0.0 => return Err(SkipReason::MissingYear),
        RawYear::Float(f) if !f.is_finite() || f.abs() >= MAX_PLAIN_FLOAT => return Err(invalid()),
        RawYear::Float(f) => {
            let digits = f.to_string().replace(['.', ','], "");
            if digits.chars().count() >= 4 {
                digits
                    .chars()
                    .take(4)
                    .collect::<String>()
                    .parse()
                    .map_err(|_| invalid())?
            } else {
                f.trunc() as i64
            }
        }
        RawYear::Text(s) if s.trim().is_empty() => return Err(SkipReason::MissingYear),
        RawYear::Text(s) => s.trim().parse().map_err(|_| invalid())?,
    };

    if (1000..=9999).contains(&year) {
        Ok(year as i32)
    } else {
        Err(invalid())
    }
}
