use crate::commands::{plural, Out};
use crate::ingest::normalize_and_parse_csv;
use crate::model::RecordId;
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// What an import stored.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ImportSummary {
    pub file: String,
    pub ids: Vec<RecordId>,
}

/// Imports every row of a CSV file for the configured user.
///
/// This operation is all-or-nothing: if any row is invalid, every row error is reported and no
/// record is stored.
///
/// # Errors
/// - If the file cannot be read, has no usable header, or has no data rows.
/// - If any row is invalid.
/// - If the database insert fails.
pub async fn import(config: Config, file: &Path) -> Result<Out<ImportSummary>> {
    let bytes = utils::read_bytes(file).await?;
    let batch = normalize_and_parse_csv(bytes.as_slice())
        .with_context(|| format!("Unable to import {}", file.display()))?;

    if !batch.is_clean() {
        for error in batch.errors() {
            warn!("{error}");
        }
        bail!(
            "{} in {}, nothing was imported:\n{}",
            plural(batch.errors().len(), "invalid row", "invalid rows"),
            file.display(),
            batch.error_messages().join("\n")
        )
    }

    debug!(
        "Importing {} records for user '{}'",
        batch.records().len(),
        config.user()
    );
    let ids = config
        .db()
        .insert_batch(config.user(), batch.records())
        .await?;

    let message = format!(
        "Imported {} from {}",
        plural(ids.len(), "charge", "charges"),
        file.display()
    );
    Ok(Out::new(
        message,
        ImportSummary {
            file: file.display().to_string(),
            ids,
        },
    ))
}
