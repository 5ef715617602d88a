//! Period-over-period change of every KPI.

use crate::analytics::{KpiId, KpiSet};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Which way a KPI moved compared to the previous period.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

serde_plain::derive_display_from_serialize!(Direction);

/// The change of one KPI.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct TrendEntry {
    /// Percent change rounded to one decimal place. `None` when either side is unavailable, the
    /// previous value is zero, or the change does not fit in a `Decimal`.
    pub percent: Option<Decimal>,
    pub direction: Direction,
    /// True if the previous period had a value for this KPI.
    pub has_prev: bool,
}

impl TrendEntry {
    fn unavailable(has_prev: bool) -> Self {
        Self {
            percent: None,
            direction: Direction::Flat,
            has_prev,
        }
    }
}

/// Compares each KPI of `current` with the same KPI in `previous`.
///
/// The percent change is `(current - previous) / previous * 100`, rounded half away from zero to
/// one decimal place. The direction compares the raw values, so a change too small to show in the
/// rounded percent still counts as up or down. A zero previous value, or an unavailable
/// value on either side, yields no percent and `Flat`.
pub fn compute_trends(current: &KpiSet, previous: Option<&KpiSet>) -> BTreeMap<KpiId, TrendEntry> {
    current
        .iter()
        .map(|(id, value)| {
            let prev = previous.and_then(|p| p.get(id));
            (id, trend(value, prev))
        })
        .collect()
}

fn trend(current: Option<Decimal>, previous: Option<Decimal>) -> TrendEntry {
    let has_prev = previous.is_some();
    let (Some(current), Some(previous)) = (current, previous) else {
        return TrendEntry::unavailable(has_prev);
    };
    if previous.is_zero() {
        return TrendEntry::unavailable(has_prev);
    }
    let percent = current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(|p| p.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero));
    let direction = match current.cmp(&previous) {
        Ordering::Greater => Direction::Up,
        Ordering::Less => Direction::Down,
        Ordering::Equal => Direction::Flat,
    };
    TrendEntry {
        percent,
        direction,
        has_prev,
    }
}
