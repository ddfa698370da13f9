//! Job listing data structures.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Upstream identifier of a listing.
///
/// The job board serves numeric ids, but strings are accepted too so that a
/// schema change upstream does not make every record look id-less.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingId::Number(n) => write!(f, "{n}"),
            ListingId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ListingId {
    fn from(value: i64) -> Self {
        ListingId::Number(value)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        ListingId::Text(value.to_string())
    }
}

/// A job posting that passed the fetch filters, enriched for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    pub id: ListingId,

    pub title: String,

    pub description: String,

    pub benefits: String,

    pub requirements: String,

    /// Salary band resolved from the salary-code table
    pub salary_text: String,

    /// Slot count with its pluralized label
    pub quantity_text: String,

    /// Parsed expiration, in the offset it was published with
    pub expiration_date: DateTime<FixedOffset>,

    /// Expiration rendered as "27 August 2025"
    pub expiration_date_text: String,

    pub region_id: i64,

    /// Region name resolved from the region table
    pub region_text: String,
}
