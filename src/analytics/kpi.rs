//! Headline figures for a set of charge records, optionally compared against a gasoline car.
//!
//! A KPI that cannot be computed, because its denominator is zero or because no usable baseline is
//! configured, is `None`. It is never reported as zero.

use crate::analytics::monthly::add;
use crate::analytics::MonthlyBucket;
use crate::model::{BaselineConfig, ChargeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Identifies a KPI.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiId {
    RecordCount,
    ExemptCount,
    PaidCount,
    TotalDistance,
    TotalEnergy,
    TotalCost,
    PaidCost,
    ExemptCost,
    /// Paid cost as a percentage of total cost.
    PaidShare,
    EnergyPerDistance,
    /// Energy per 100 distance units, e.g. kWh/100km.
    EnergyPer100Distance,
    CostPerEnergy,
    CostPerDistance,
    /// What the same distance would have cost in the baseline gasoline car.
    GasolineCost,
    SavingsTotal,
    SavingsPaid,
    SavingsPerDistance,
}

serde_plain::derive_display_from_serialize!(KpiId);
serde_plain::derive_fromstr_from_deserialize!(KpiId);

/// A mapping of every `KpiId` to its value, or to `None` when it is unavailable.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiSet(BTreeMap<KpiId, Option<Decimal>>);

impl KpiSet {
    /// The value of `id`. `None` if unavailable or not part of this set.
    pub fn get(&self, id: KpiId) -> Option<Decimal> {
        self.0.get(&id).copied().flatten()
    }

    /// True if `id` is part of this set, whether or not it is available.
    pub fn contains(&self, id: KpiId) -> bool {
        self.0.contains_key(&id)
    }

    pub fn is_available(&self, id: KpiId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (KpiId, Option<Decimal>)> + '_ {
        self.0.iter().map(|(&id, &value)| (id, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn set(&mut self, id: KpiId, value: Option<Decimal>) {
        let _ = self.0.insert(id, value);
    }
}

/// The aggregates that KPIs are derived from. Built either from a whole record history or from a
/// single monthly bucket. A `None` aggregate overflowed, and every KPI derived from it is
/// unavailable.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct KpiInput {
    pub count: usize,
    pub exempt_count: usize,
    pub energy: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub paid_cost: Option<Decimal>,
    pub distance: Option<Decimal>,
}

impl Default for KpiInput {
    fn default() -> Self {
        Self {
            count: 0,
            exempt_count: 0,
            energy: Some(Decimal::ZERO),
            cost: Some(Decimal::ZERO),
            paid_cost: Some(Decimal::ZERO),
            distance: Some(Decimal::ZERO),
        }
    }
}

impl KpiInput {
    /// Sums a chronologically ordered record history. Distance is taken from the first and last
    /// odometer readings, see `history_distance`.
    pub fn from_records(records: &[ChargeRecord]) -> Self {
        let mut input = KpiInput {
            distance: history_distance(records),
            ..KpiInput::default()
        };
        for record in records {
            let cost = record.cost().value();
            input.count += 1;
            add(&mut input.energy, record.energy().value());
            add(&mut input.cost, cost);
            if record.exempt() {
                input.exempt_count += 1;
            } else {
                add(&mut input.paid_cost, cost);
            }
        }
        input
    }

    /// Uses a bucket's sums and its derived distance.
    pub fn from_bucket(bucket: &MonthlyBucket) -> Self {
        KpiInput {
            count: bucket.count,
            exempt_count: bucket.exempt_count,
            energy: bucket.energy,
            cost: bucket.cost,
            paid_cost: bucket.paid_cost,
            distance: bucket.distance,
        }
    }
}

/// Distance covered by a whole history: the last odometer reading minus the first, the only
/// reading when there is just one, and zero for no records. Never negative, and `None` only when
/// the difference does not fit in a `Decimal`.
pub fn history_distance(records: &[ChargeRecord]) -> Option<Decimal> {
    let distance = match records {
        [] => Some(Decimal::ZERO),
        [only] => Some(only.odometer().value()),
        [first, .., last] => last
            .odometer()
            .value()
            .checked_sub(first.odometer().value()),
    };
    distance.map(|d| d.max(Decimal::ZERO))
}

/// KPIs for a whole record history.
pub fn history_kpis(records: &[ChargeRecord], baseline: Option<&BaselineConfig>) -> KpiSet {
    compute_kpis(&KpiInput::from_records(records), baseline)
}

/// KPIs for a single month.
pub fn bucket_kpis(bucket: &MonthlyBucket, baseline: Option<&BaselineConfig>) -> KpiSet {
    compute_kpis(&KpiInput::from_bucket(bucket), baseline)
}

/// Computes every KPI from `input`. A negative distance is treated as zero. Gasoline comparisons
/// are only computed when `baseline` is present with an efficiency greater than zero.
pub fn compute_kpis(input: &KpiInput, baseline: Option<&BaselineConfig>) -> KpiSet {
    let KpiInput {
        energy,
        cost,
        paid_cost,
        ..
    } = *input;
    let distance = input.distance.map(|d| d.max(Decimal::ZERO));
    let exempt_cost = cost.zip(paid_cost).and_then(|(c, p)| c.checked_sub(p));
    let per_distance = |value: Option<Decimal>| ratio(value, distance);

    let gasoline_cost = baseline
        .filter(|b| b.is_usable())
        .zip(distance)
        .and_then(|(b, distance)| {
            distance
                .checked_div(b.fuel_efficiency)
                .and_then(|fuel| fuel.checked_mul(b.fuel_price))
        });
    let savings_total = gasoline_cost
        .zip(cost)
        .and_then(|(gas, cost)| gas.checked_sub(cost));
    let savings_paid = gasoline_cost
        .zip(paid_cost)
        .and_then(|(gas, paid)| gas.checked_sub(paid));

    let mut kpis = KpiSet::default();
    kpis.set(KpiId::RecordCount, Some(Decimal::from(input.count)));
    kpis.set(KpiId::ExemptCount, Some(Decimal::from(input.exempt_count)));
    kpis.set(
        KpiId::PaidCount,
        Some(Decimal::from(input.count - input.exempt_count)),
    );
    kpis.set(KpiId::TotalDistance, distance);
    kpis.set(KpiId::TotalEnergy, energy);
    kpis.set(KpiId::TotalCost, cost);
    kpis.set(KpiId::PaidCost, paid_cost);
    kpis.set(KpiId::ExemptCost, exempt_cost);
    kpis.set(
        KpiId::PaidShare,
        ratio(paid_cost, cost).and_then(|r| r.checked_mul(HUNDRED)),
    );
    kpis.set(KpiId::EnergyPerDistance, per_distance(energy));
    kpis.set(
        KpiId::EnergyPer100Distance,
        per_distance(energy).and_then(|r| r.checked_mul(HUNDRED)),
    );
    kpis.set(KpiId::CostPerEnergy, ratio(cost, energy));
    kpis.set(KpiId::CostPerDistance, per_distance(cost));
    kpis.set(KpiId::GasolineCost, gasoline_cost);
    kpis.set(KpiId::SavingsTotal, savings_total);
    kpis.set(KpiId::SavingsPaid, savings_paid);
    kpis.set(KpiId::SavingsPerDistance, per_distance(savings_total));
    kpis
}

/// `numerator / denominator`, unavailable when either side is, or for a zero denominator.
fn ratio(numerator: Option<Decimal>, denominator: Option<Decimal>) -> Option<Decimal> {
    let (numerator, denominator) = (numerator?, denominator?);
    if denominator.is_zero() {
        None
    } else {
        numerator.checked_div(denominator)
    }
}
