//! Writes charge records in the same CSV layout that `normalize_and_parse_csv` reads.

use crate::model::{ChargeColumn, ChargeInput, Quantity};
use crate::Result;
use anyhow::Context;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;

/// One CSV row. Field order matches `ChargeColumn::ALL`.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: &'a str,
    energy: Quantity,
    cost: Quantity,
    exempt: bool,
    odometer: Quantity,
    location: &'a str,
    notes: &'a str,
}

impl<'a> From<&'a ChargeInput> for CsvRow<'a> {
    fn from(input: &'a ChargeInput) -> Self {
        Self {
            date: &input.date,
            energy: input.energy,
            cost: input.cost,
            exempt: input.exempt,
            odometer: input.odometer,
            location: &input.location,
            notes: &input.notes,
        }
    }
}

/// Writes a header followed by one row per record. The header is written even when there are no
/// records.
pub fn write_csv<'a, W>(records: impl IntoIterator<Item = &'a ChargeInput>, w: W) -> Result<()>
where
    W: Write,
{
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(w);
    writer
        .write_record(ChargeColumn::ALL.iter().map(|c| c.header()))
        .context("Unable to write the CSV header")?;
    for record in records {
        writer
            .serialize(CsvRow::from(record))
            .with_context(|| format!("Unable to write the CSV row for {}", record.date))?;
    }
    writer.flush().context("Unable to flush the CSV output")?;
    Ok(())
}

/// Renders records to a CSV `String`.
pub fn to_csv_string<'a>(records: impl IntoIterator<Item = &'a ChargeInput>) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    String::from_utf8(buf).context("CSV output was not UTF-8")
}
