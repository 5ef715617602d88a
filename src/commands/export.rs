use crate::commands::{plural, Out};
use crate::filter::RecordFilter;
use crate::ingest::to_csv_string;
use crate::{utils, Config, Result};
use std::path::Path;

/// Writes the configured user's charges that match `filter` to `out` in the import format.
pub async fn export(config: Config, out: &Path, filter: &RecordFilter) -> Result<Out<usize>> {
    let records = config.db().fetch_records(config.user()).await?;
    let matching = filter.apply(&records);
    let csv = to_csv_string(matching.iter().map(|r| &r.input))?;
    utils::write(out, csv).await?;
    Ok(Out::new(
        format!(
            "Exported {} to {}",
            plural(matching.len(), "charge", "charges"),
            out.display()
        ),
        matching.len(),
    ))
}
