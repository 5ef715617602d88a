//! Narrows a list of charge records for listing and exporting.

use crate::model::ChargeRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which records to keep based on their exemption flag.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExemptFilter {
    /// Keep every record.
    #[default]
    All,
    /// Only records the user did not pay for.
    Yes,
    /// Only records the user paid for.
    No,
}

serde_plain::derive_display_from_serialize!(ExemptFilter);
serde_plain::derive_fromstr_from_deserialize!(ExemptFilter);

/// Criteria a record must meet. The default filter keeps everything.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
    /// Case-insensitive substring of the notes.
    pub notes: Option<String>,
    pub exempt: ExemptFilter,
    /// Inclusive lower bound.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub date_to: Option<NaiveDate>,
}

impl RecordFilter {
    /// True if `record` meets every criterion. When either date bound is set, a record whose date
    /// cannot be parsed never matches.
    pub fn matches(&self, record: &ChargeRecord) -> bool {
        if !contains_ignore_case(record.location(), self.location.as_deref()) {
            return false;
        }
        if !contains_ignore_case(record.notes(), self.notes.as_deref()) {
            return false;
        }
        let exempt_ok = match self.exempt {
            ExemptFilter::All => true,
            ExemptFilter::Yes => record.exempt(),
            ExemptFilter::No => !record.exempt(),
        };
        if !exempt_ok {
            return false;
        }
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(date) = record.parsed_date() else {
            return false;
        };
        self.date_from.map_or(true, |from| date >= from)
            && self.date_to.map_or(true, |to| date <= to)
    }

    /// Keeps the matching records, preserving their order.
    pub fn apply<'a>(&self, records: &'a [ChargeRecord]) -> Vec<&'a ChargeRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        None | Some("") => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}
