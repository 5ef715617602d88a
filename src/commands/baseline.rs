use crate::args::BaselineArgs;
use crate::commands::Out;
use crate::model::BaselineConfig;
use crate::{Config, Result};
use anyhow::ensure;

/// Shows the configured user's gasoline baseline, first replacing it when both a fuel price and an
/// efficiency are given.
///
/// # Errors
/// - If the fuel price is negative or the efficiency is not greater than zero.
pub async fn baseline(config: Config, args: &BaselineArgs) -> Result<Out<Option<BaselineConfig>>> {
    if let (Some(price), Some(efficiency)) = (args.fuel_price(), args.efficiency()) {
        ensure!(
            !price.is_negative(),
            "The fuel price must not be negative, got {price}"
        );
        ensure!(
            efficiency.is_positive(),
            "The fuel efficiency must be greater than zero, got {efficiency}"
        );
        let baseline = BaselineConfig::new(price.value(), efficiency.value());
        config
            .db()
            .upsert_baseline(config.user(), &baseline)
            .await?;
    }

    let current = config.db().fetch_baseline(config.user()).await?;
    let message = match &current {
        None => String::from(
            "No baseline is set, savings cannot be computed. Set one with --fuel-price and \
            --efficiency",
        ),
        Some(b) => format!(
            "Baseline: fuel at {} per unit, {} {} per unit",
            config.format().money(b.fuel_price),
            b.fuel_efficiency,
            config.format().distance_unit
        ),
    };
    Ok(Out::new(message, current))
}
