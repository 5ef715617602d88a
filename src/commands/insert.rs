//! Insert command handler.

use crate::args::ChargeArgs;
use crate::commands::Out;
use crate::ingest::validate_row;
use crate::model::{ChargeColumn, ChargeInput, RecordId};
use crate::{Config, Result};
use anyhow::{anyhow, bail};

/// Inserts a single charge for the configured user and returns its new id.
///
/// # Errors
/// - If any field fails validation, see `charge_input`.
/// - If the database insert fails.
pub async fn insert(config: Config, args: &ChargeArgs) -> Result<Out<RecordId>> {
    let input = charge_input(args)?;
    let id = config.db().insert_record(config.user(), &input).await?;
    Ok(Out::new(
        format!("Inserted charge {id} dated {}", input.date),
        id,
    ))
}

/// Validates a charge given on the command line with the same rules as an imported CSV row. In
/// addition, the date must be in a recognized layout.
pub(crate) fn charge_input(args: &ChargeArgs) -> Result<ChargeInput> {
    let exempt = if args.exempt() { "true" } else { "" };
    let input = validate_row(|column| match column {
        ChargeColumn::Date => args.date(),
        ChargeColumn::Energy => args.energy(),
        ChargeColumn::Cost => args.cost(),
        ChargeColumn::Exempt => exempt,
        ChargeColumn::Odometer => args.odometer(),
        ChargeColumn::Location => args.location(),
        ChargeColumn::Notes => args.notes(),
    })
    .map_err(|(_, reason)| anyhow!("Invalid charge: {reason}"))?;

    if input.parsed_date().is_none() {
        bail!(
            "Invalid charge: date '{}' is not a recognized date, use YYYY-MM-DD, DD/MM/YYYY or \
            YYYY/MM/DD",
            input.date
        )
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[test]
    fn test_charge_input_valid() {
        let args = ChargeArgs::new("15/03/2024", "12,5", "0", true, "100").with_location(" Home ");
        let input = charge_input(&args).unwrap();
        assert_eq!(input.date, "15/03/2024");
        assert_eq!(input.energy.to_string(), "12.5");
        assert!(input.exempt);
        assert_eq!(input.location, "Home");
    }

    #[test]
    fn test_charge_input_rules() {
        let cases = [
            (ChargeArgs::new("", "1", "1", false, "1"), "date empty"),
            (
                ChargeArgs::new("2024-01-01", "0", "1", false, "1"),
                "energy must be > 0",
            ),
            (
                ChargeArgs::new("2024-01-01", "1", "-1", false, "1"),
                "cost must be >= 0",
            ),
            (
                ChargeArgs::new("2024-01-01", "1", "1", false, "x"),
                "odometer is not a number",
            ),
            (
                ChargeArgs::new("yesterday", "1", "1", false, "1"),
                "not a recognized date",
            ),
        ];
        for (args, expected) in cases {
            let err = charge_input(&args).unwrap_err().to_string();
            assert!(err.contains(expected), "{err} should contain {expected}");
        }
    }

    #[tokio::test]
    async fn test_insert() {
        let env = TestEnv::new().await;
        let args = ChargeArgs::new("2024-03-01", "20", "35.5", false, "12000").with_notes("fast");
        let out = insert(env.config(), &args).await.unwrap();
        let id = *out.structure().unwrap();
        assert!(out.message().contains(&id.to_string()));

        let records = env.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(id));
        assert_eq!(records[0].notes(), "fast");
    }

    #[tokio::test]
    async fn test_insert_invalid_stores_nothing() {
        let env = TestEnv::new().await;
        let args = ChargeArgs::new("2024-03-01", "-2", "1", false, "1");
        assert!(insert(env.config(), &args).await.is_err());
        assert!(env.records().await.is_empty());
    }
}
