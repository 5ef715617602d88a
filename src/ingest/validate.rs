//! Header and row validation for normalized CSV text.

use crate::error::{IngestError, RowError};
use crate::model::{ChargeColumn, ChargeInput, Quantity};
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, trace};

/// Cell values that mark a charge as exempt. Anything else is not exempt.
const TRUTHY: &[&str] = &["true", "1", "sim", "yes", "y"];

/// Largest energy, cost or odometer value accepted in a single cell. Keeps sums over any realistic
/// history far inside `Decimal`'s range.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// The outcome of validating an upload: every well-formed row, and a rejection for every other
/// non-blank row. Whether to accept a batch that has errors is left to the caller.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Batch {
    records: Vec<ChargeInput>,
    errors: Vec<RowError>,
}

impl Batch {
    pub fn records(&self) -> &[ChargeInput] {
        &self.records
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    /// True when no row was rejected.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// Splits the batch into the valid records and the rendered rejection messages.
    pub fn into_parts(self) -> (Vec<ChargeInput>, Vec<String>) {
        let messages = self.error_messages();
        (self.records, messages)
    }
}

/// Validates `text`, which must already be normalized, using `delimiter` to split fields.
///
/// # Errors
/// - `HeaderMissing` if there is no header row.
/// - `HeaderInvalid` if a required column is absent.
/// - `EmptyFile` if no row produced either a record or an error.
pub fn validate(text: &str, delimiter: u8) -> Result<Batch, IngestError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut header = StringRecord::new();
    match reader.read_record(&mut header) {
        Ok(true) => {}
        Ok(false) => return Err(IngestError::HeaderMissing),
        Err(e) => return Err(IngestError::Read(e.into())),
    }
    let columns = map_header(&header)?;

    let mut batch = Batch::default();
    let mut row = StringRecord::new();
    loop {
        match reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                batch.errors.push(RowError::new(line, None, e.to_string(), ""));
                continue;
            }
        }
        // The reader now sits at the start of the next record.
        let end = reader.position().byte();
        let (line, start) = row
            .position()
            .map(|p| (p.line(), p.byte()))
            .unwrap_or_default();
        let cell = |col: ChargeColumn| {
            columns
                .get(&col)
                .and_then(|&ix| row.get(ix))
                .unwrap_or_default()
        };

        if ChargeColumn::ALL.iter().all(|&c| cell(c).trim().is_empty()) {
            trace!("Skipping blank line {line}");
            continue;
        }

        match validate_row(cell) {
            Ok(record) => batch.records.push(record),
            Err((field, reason)) => {
                let content = original_content(text, start, end);
                batch
                    .errors
                    .push(RowError::new(line, Some(field), reason, content));
            }
        }
    }

    debug!(
        "Validated {} rows with {} errors",
        batch.records.len(),
        batch.errors.len()
    );
    if batch.records.is_empty() && batch.errors.is_empty() {
        return Err(IngestError::EmptyFile);
    }
    Ok(batch)
}

/// The raw text of the record spanning `start..end`, without its line terminator.
fn original_content(text: &str, start: u64, end: u64) -> &str {
    let (Ok(start), Ok(end)) = (usize::try_from(start), usize::try_from(end)) else {
        return "";
    };
    text.get(start..end)
        .unwrap_or_default()
        .trim_end_matches(['\n', '\r'])
}

/// Maps each required column to its position in the header. When a column appears twice, the
/// first occurrence wins.
fn map_header(header: &StringRecord) -> Result<HashMap<ChargeColumn, usize>, IngestError> {
    let normalized: Vec<String> = header
        .iter()
        .map(|h| h.replace('\u{feff}', "").trim().to_lowercase())
        .collect();
    if normalized.iter().all(|h| h.is_empty()) {
        return Err(IngestError::HeaderMissing);
    }

    let mut columns = HashMap::new();
    for (ix, name) in normalized.iter().enumerate() {
        if let Some(col) = ChargeColumn::from_header(name) {
            let _ = columns.entry(col).or_insert(ix);
        }
    }

    let mut missing: Vec<String> = ChargeColumn::ALL
        .iter()
        .filter(|c| !columns.contains_key(c))
        .map(|c| c.header().to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        let mut expected: Vec<String> = ChargeColumn::ALL
            .iter()
            .map(|c| c.header().to_string())
            .collect();
        expected.sort();
        return Err(IngestError::HeaderInvalid { expected, missing });
    }
    Ok(columns)
}

/// Validates the cells of one row. On failure, returns the offending column and a reason.
pub(crate) fn validate_row<'a>(
    cell: impl Fn(ChargeColumn) -> &'a str,
) -> Result<ChargeInput, (ChargeColumn, String)> {
    let date = cell(ChargeColumn::Date).trim();
    if date.is_empty() {
        return Err((ChargeColumn::Date, String::from("date empty")));
    }

    let energy = quantity(ChargeColumn::Energy, cell(ChargeColumn::Energy))?;
    if !energy.is_positive() {
        return Err(out_of_range(ChargeColumn::Energy, "> 0", &cell));
    }

    let cost = quantity(ChargeColumn::Cost, cell(ChargeColumn::Cost))?;
    if cost.is_negative() {
        return Err(out_of_range(ChargeColumn::Cost, ">= 0", &cell));
    }

    let odometer = quantity(ChargeColumn::Odometer, cell(ChargeColumn::Odometer))?;
    if odometer.is_negative() {
        return Err(out_of_range(ChargeColumn::Odometer, ">= 0", &cell));
    }

    Ok(ChargeInput {
        date: date.to_string(),
        energy,
        cost,
        exempt: parse_exempt(cell(ChargeColumn::Exempt)),
        odometer,
        location: cell(ChargeColumn::Location).trim().to_string(),
        notes: cell(ChargeColumn::Notes).trim().to_string(),
    })
}

fn quantity(col: ChargeColumn, raw: &str) -> Result<Quantity, (ChargeColumn, String)> {
    let value = Quantity::from_str(raw)
        .map_err(|_| (col, format!("{col} is not a number, got '{raw}'")))?;
    if value.value() > MAX_QUANTITY {
        return Err((col, format!("{col} must be <= {MAX_QUANTITY}, got '{raw}'")));
    }
    Ok(value)
}

fn out_of_range<'a>(
    col: ChargeColumn,
    bound: &str,
    cell: impl Fn(ChargeColumn) -> &'a str,
) -> (ChargeColumn, String) {
    (col, format!("{col} must be {bound}, got '{}'", cell(col)))
}

/// Case-insensitive match against the truthy token set.
pub fn parse_exempt(raw: &str) -> bool {
    let token = raw.trim().to_lowercase();
    TRUTHY.contains(&token.as_str())
}
