//! Human-readable rendering of numbers for the command line. All formatting settings come from an
//! explicit `FormatConfig`, there is no global locale.

use crate::analytics::{KpiId, TrendEntry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

const UNAVAILABLE: &str = "n/a";
const ENERGY_UNIT: &str = "kWh";

/// Presentation settings, stored in `config.json`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Prefix for monetary values, e.g. `R$` or `$`.
    pub currency_symbol: String,
    /// Unit the odometer is read in, e.g. `km` or `mi`.
    pub distance_unit: String,
    /// Group thousands with commas.
    pub thousands_separator: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            currency_symbol: String::from("R$"),
            distance_unit: String::from("km"),
            thousands_separator: true,
        }
    }
}

/// How a KPI's value is displayed.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Kind {
    Count,
    Money,
    Distance,
    Energy,
    Percent,
    EnergyPerDistance,
    EnergyPer100Distance,
    MoneyPerEnergy,
    MoneyPerDistance,
}

fn kind(id: KpiId) -> Kind {
    match id {
        KpiId::RecordCount | KpiId::ExemptCount | KpiId::PaidCount => Kind::Count,
        KpiId::TotalCost
        | KpiId::PaidCost
        | KpiId::ExemptCost
        | KpiId::GasolineCost
        | KpiId::SavingsTotal
        | KpiId::SavingsPaid => Kind::Money,
        KpiId::TotalDistance => Kind::Distance,
        KpiId::TotalEnergy => Kind::Energy,
        KpiId::PaidShare => Kind::Percent,
        KpiId::EnergyPerDistance => Kind::EnergyPerDistance,
        KpiId::EnergyPer100Distance => Kind::EnergyPer100Distance,
        KpiId::CostPerEnergy => Kind::MoneyPerEnergy,
        KpiId::CostPerDistance | KpiId::SavingsPerDistance => Kind::MoneyPerDistance,
    }
}

/// A short label for a KPI.
pub fn kpi_label(id: KpiId) -> &'static str {
    match id {
        KpiId::RecordCount => "Charges",
        KpiId::ExemptCount => "Exempt charges",
        KpiId::PaidCount => "Paid charges",
        KpiId::TotalDistance => "Distance",
        KpiId::TotalEnergy => "Energy",
        KpiId::TotalCost => "Total cost",
        KpiId::PaidCost => "Paid cost",
        KpiId::ExemptCost => "Exempt cost",
        KpiId::PaidShare => "Paid share",
        KpiId::EnergyPerDistance => "Energy per distance",
        KpiId::EnergyPer100Distance => "Energy per 100",
        KpiId::CostPerEnergy => "Cost per kWh",
        KpiId::CostPerDistance => "Cost per distance",
        KpiId::GasolineCost => "Gasoline cost",
        KpiId::SavingsTotal => "Savings",
        KpiId::SavingsPaid => "Savings (paid only)",
        KpiId::SavingsPerDistance => "Savings per distance",
    }
}

impl FormatConfig {
    /// A monetary value with two decimal places, e.g. `-R$1,234.50`.
    pub fn money(&self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!(
            "{sign}{}{}",
            self.currency_symbol,
            self.number(rounded.abs(), 2)
        )
    }

    /// A plain number with `dp` decimal places, at most two.
    pub fn number(&self, value: Decimal, dp: u32) -> String {
        let dp = dp.min(2);
        let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let abs = rounded.abs();
        if !self.thousands_separator {
            return format!("{sign}{:.*}", dp as usize, abs);
        }
        let float = abs.to_f64().unwrap_or_default();
        let grouped = match dp {
            0 => format_num::format_num!(",.0", float),
            1 => format_num::format_num!(",.1", float),
            _ => format_num::format_num!(",.2", float),
        };
        format!("{sign}{grouped}")
    }

    /// A distance with its unit, e.g. `1,200 km`.
    pub fn distance(&self, value: Decimal) -> String {
        format!("{} {}", self.number(value, 0), self.distance_unit)
    }

    /// A KPI value with its unit, or `n/a` when unavailable.
    pub fn kpi(&self, id: KpiId, value: Option<Decimal>) -> String {
        let Some(value) = value else {
            return String::from(UNAVAILABLE);
        };
        let unit = &self.distance_unit;
        match kind(id) {
            Kind::Count => self.number(value, 0),
            Kind::Money => self.money(value),
            Kind::Distance => self.distance(value),
            Kind::Energy => format!("{} {ENERGY_UNIT}", self.number(value, 2)),
            Kind::Percent => format!("{}%", self.number(value, 1)),
            Kind::EnergyPerDistance => format!("{} {ENERGY_UNIT}/{unit}", self.number(value, 2)),
            Kind::EnergyPer100Distance => {
                format!("{} {ENERGY_UNIT}/100{unit}", self.number(value, 2))
            }
            Kind::MoneyPerEnergy => format!("{}/{ENERGY_UNIT}", self.money(value)),
            Kind::MoneyPerDistance => format!("{}/{unit}", self.money(value)),
        }
    }

    /// A trend such as `+10.0% up`, or `n/a` when there is nothing to compare against.
    pub fn trend(&self, trend: &TrendEntry) -> String {
        match trend.percent {
            None => String::from(UNAVAILABLE),
            Some(p) => {
                let sign = if p > Decimal::ZERO {
                    "+"
                } else {
                    ""
                };
                format!("{sign}{}% {}", self.number(p, 1), trend.direction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Direction;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn plain() -> FormatConfig {
        FormatConfig {
            currency_symbol: String::from("$"),
            distance_unit: String::from("mi"),
            thousands_separator: false,
        }
    }

    #[test]
    fn test_money() {
        let f = FormatConfig::default();
        assert_eq!(f.money(d("1234.5")), "R$1,234.50");
        assert_eq!(f.money(d("-3.456")), "-R$3.46");
        assert_eq!(f.money(Decimal::ZERO), "R$0.00");
        assert_eq!(plain().money(d("1234.5")), "$1234.50");
    }

    #[test]
    fn test_number_without_separator_rounds() {
        assert_eq!(plain().number(d("2.345"), 2), "2.35");
        assert_eq!(plain().number(d("10"), 1), "10.0");
        assert_eq!(plain().number(d("1999.5"), 0), "2000");
    }

    #[test]
    fn test_kpi_units() {
        let f = FormatConfig::default();
        assert_eq!(f.kpi(KpiId::TotalDistance, Some(d("1200"))), "1,200 km");
        assert_eq!(f.kpi(KpiId::RecordCount, Some(d("3"))), "3");
        assert_eq!(
            f.kpi(KpiId::EnergyPer100Distance, Some(d("15.5"))),
            "15.50 kWh/100km"
        );
        assert_eq!(f.kpi(KpiId::CostPerDistance, Some(d("0.2"))), "R$0.20/km");
        assert_eq!(plain().kpi(KpiId::PaidShare, Some(d("87.5"))), "87.5%");
    }

    #[test]
    fn test_unavailable_is_not_zero() {
        assert_eq!(FormatConfig::default().kpi(KpiId::SavingsTotal, None), "n/a");
    }

    #[test]
    fn test_trend() {
        let f = plain();
        let up = TrendEntry {
            percent: Some(d("10.0")),
            direction: Direction::Up,
            has_prev: true,
        };
        let down = TrendEntry {
            percent: Some(d("-2.5")),
            direction: Direction::Down,
            has_prev: true,
        };
        let none = TrendEntry {
            percent: None,
            direction: Direction::Flat,
            has_prev: false,
        };
        assert_eq!(f.trend(&up), "+10.0% up");
        assert_eq!(f.trend(&down), "-2.5% down");
        assert_eq!(f.trend(&none), "n/a");
    }

    #[test]
    fn test_config_fills_missing_fields() {
        let f: FormatConfig = serde_json::from_str(r#"{"distance_unit": "mi"}"#).unwrap();
        assert_eq!(f.distance_unit, "mi");
        assert_eq!(f.currency_symbol, "R$");
        assert!(f.thousands_separator);
    }
}
