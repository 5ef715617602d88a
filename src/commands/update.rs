use crate::args::UpdateArgs;
use crate::commands::insert::charge_input;
use crate::commands::Out;
use crate::model::ChargeRecord;
use crate::{Config, Result};
use anyhow::Context;

/// Replaces every field of one of the configured user's charges.
///
/// # Errors
/// - If any field fails validation.
/// - If the charge does not exist or belongs to another user.
pub async fn update(config: Config, args: &UpdateArgs) -> Result<Out<ChargeRecord>> {
    let input = charge_input(args.charge())?;
    let id = args.id();
    config.db().update_record(config.user(), id, &input).await?;
    let record = config
        .db()
        .fetch_record(config.user(), id)
        .await?
        .with_context(|| format!("Charge record {id} disappeared after the update"))?;
    Ok(Out::new(format!("Updated charge {id}"), record))
}
