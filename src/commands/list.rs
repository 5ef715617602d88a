use crate::commands::{plural, Out};
use crate::filter::RecordFilter;
use crate::format::FormatConfig;
use crate::model::ChargeRecord;
use crate::{Config, Result};

/// Lists the configured user's charges that match `filter`, oldest first.
pub async fn list(config: Config, filter: &RecordFilter) -> Result<Out<Vec<ChargeRecord>>> {
    let records = config.db().fetch_records(config.user()).await?;
    let matching: Vec<ChargeRecord> = filter.apply(&records).into_iter().cloned().collect();

    let mut message = plural(matching.len(), "charge", "charges");
    for record in &matching {
        message.push('\n');
        message.push_str(&line(config.format(), record));
    }
    Ok(Out::new(message, matching))
}

fn line(format: &FormatConfig, record: &ChargeRecord) -> String {
    let id = record.id.map(|id| id.to_string()).unwrap_or_default();
    let exempt = if record.exempt() { " exempt" } else { "" };
    let mut line = format!(
        "#{id} {} {} kWh {}{exempt} @ {}",
        record.date(),
        record.energy(),
        format.money(record.cost().value()),
        format.distance(record.odometer().value()),
    );
    if !record.location().is_empty() {
        line.push_str(&format!(" [{}]", record.location()));
    }
    if !record.notes().is_empty() {
        line.push_str(&format!(" {}", record.notes()));
    }
    line
}
