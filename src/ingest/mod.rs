//! The CSV ingestion pipeline: untrusted uploaded bytes in, validated charge records and a list of
//! rejected rows out.
//!
//! The stages run in order:
//! 1. `text` decodes and normalizes the raw bytes.
//! 2. `sniff` picks the field delimiter from a bounded sample.
//! 3. `validate` checks the header and every row.

mod export;
mod sniff;
mod text;
mod validate;

pub use export::{to_csv_string, write_csv};
pub use sniff::{sniff_delimiter, CANDIDATES, SAMPLE_BYTES};
pub use text::{normalize, read_text};
pub use validate::{parse_exempt, validate, Batch};

pub(crate) use validate::validate_row;

use crate::error::IngestError;
use std::io::Read;
use tracing::debug;

/// Reads an upload to the end, then decodes, sniffs and validates it.
///
/// # Errors
/// - `Read` if the stream cannot be read.
/// - `HeaderMissing`, `HeaderInvalid` or `EmptyFile` as described on `validate`.
pub fn normalize_and_parse_csv(reader: impl Read) -> Result<Batch, IngestError> {
    let text = read_text(reader)?;
    debug!("Read {} bytes of normalized text", text.len());
    let delimiter = sniff_delimiter(&text);
    validate(&text, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_with_crlf_bom_and_semicolons() {
        let raw = b"\xEF\xBB\xBFdate;energy;cost;exempt;odometer;location;notes\r\n\
                    2024-01-01;12,5;30,10;sim;1000;Casa;\r\n\
                    \r\n\
                    2024-01-08;10;25;n\xE3o;1100;Casa;\r\n";
        let batch = normalize_and_parse_csv(&raw[..]).unwrap();
        assert!(batch.is_clean());
        assert_eq!(batch.records().len(), 2);
        assert!(batch.records()[0].exempt);
        assert!(!batch.records()[1].exempt);
    }

    #[test]
    fn test_pipeline_latin1_notes() {
        let raw = b"date,energy,cost,exempt,odometer,location,notes\n\
                    2024-01-01,10,5,,100,S\xE3o Paulo,\xF3timo\n";
        let batch = normalize_and_parse_csv(&raw[..]).unwrap();
        assert_eq!(batch.records()[0].location, "São Paulo");
        assert_eq!(batch.records()[0].notes, "ótimo");
    }

    #[test]
    fn test_pipeline_empty_input() {
        assert!(matches!(
            normalize_and_parse_csv(&b""[..]),
            Err(IngestError::HeaderMissing)
        ));
    }
}
