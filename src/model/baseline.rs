use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The gasoline-powered car a user compares their charging costs against.
///
/// A user may not have configured one at all, which is modelled as `Option<BaselineConfig>` at the
/// call sites. Missing configuration means the gasoline comparison cannot be computed; it never
/// means the comparison is zero.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BaselineConfig {
    /// Price of one unit of fuel, e.g. one liter.
    pub fuel_price: Decimal,
    /// Distance driven per unit of fuel, e.g. km per liter.
    pub fuel_efficiency: Decimal,
}

impl BaselineConfig {
    pub fn new(fuel_price: Decimal, fuel_efficiency: Decimal) -> Self {
        Self {
            fuel_price,
            fuel_efficiency,
        }
    }

    /// Gasoline comparisons are only defined for a strictly positive efficiency.
    pub fn is_usable(&self) -> bool {
        self.fuel_efficiency > Decimal::ZERO
    }
}
