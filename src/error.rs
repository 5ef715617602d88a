//! Error types. Application code uses `anyhow` through the `Error` and `Result` aliases, while the
//! ingestion pipeline reports its structural failures with the typed `IngestError`.

use crate::model::ChargeColumn;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort an entire ingestion attempt. Per-row problems are not errors at this level,
/// they are collected as `RowError` values alongside the valid records.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The byte stream could not be read at all. Decoding never produces this.
    #[error("Unable to read the uploaded file: {0}")]
    Read(#[from] std::io::Error),

    /// The input contained no header row.
    #[error("The CSV file has no header row")]
    HeaderMissing,

    /// One or more required headers are absent. Both lists are sorted.
    #[error(
        "Invalid headers. Expected: {}. Missing: {}",
        .expected.join(", "),
        .missing.join(", ")
    )]
    HeaderInvalid {
        expected: Vec<String>,
        missing: Vec<String>,
    },

    /// A header was present but every data row was blank.
    #[error("No valid rows were found in the CSV file")]
    EmptyFile,
}

/// A rejected data row. `line` is 1-based with the header on line 1.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RowError {
    line: u64,
    field: Option<ChargeColumn>,
    reason: String,
    content: String,
}

impl RowError {
    pub(crate) fn new(
        line: u64,
        field: Option<ChargeColumn>,
        reason: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            line,
            field,
            reason: reason.into(),
            content: content.into(),
        }
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    /// The offending column, when the failure can be pinned to one.
    pub fn field(&self) -> Option<ChargeColumn> {
        self.field
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// The row exactly as it appeared in the input, without its line terminator.
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Display for RowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Line {}: {}. Content: {}",
            self.line, self.reason, self.content
        )
    }
}

impl std::error::Error for RowError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_invalid_message_lists_both_sets() {
        let e = IngestError::HeaderInvalid {
            expected: vec!["cost".into(), "date".into()],
            missing: vec!["date".into()],
        };
        assert_eq!(
            e.to_string(),
            "Invalid headers. Expected: cost, date. Missing: date"
        );
    }

    #[test]
    fn test_row_error_display() {
        let e = RowError::new(
            3,
            Some(ChargeColumn::Energy),
            "energy must be > 0, got '0'",
            "2024-01-01,0,10",
        );
        assert_eq!(
            e.to_string(),
            "Line 3: energy must be > 0, got '0'. Content: 2024-01-01,0,10"
        );
        assert_eq!(e.field(), Some(ChargeColumn::Energy));
    }
}
