//! Groups a user's charge records into calendar-month buckets.

use crate::model::ChargeRecord;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Raw sums for one calendar month. A sum that overflows becomes `None`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// `YYYY-MM`, or the first seven characters of an unparsable date.
    pub key: String,
    pub energy: Option<Decimal>,
    pub cost: Option<Decimal>,
    /// Cost of the records that were not exempt.
    pub paid_cost: Option<Decimal>,
    pub count: usize,
    pub exempt_count: usize,
    /// Odometer readings in the order they were encountered.
    pub odometers: Vec<Decimal>,
    /// Positions of this bucket's records in the aggregated slice.
    pub members: Vec<usize>,
    /// Distance driven in this month, see `aggregate_monthly`.
    pub distance: Option<Decimal>,
}

impl MonthlyBucket {
    fn new(key: String) -> Self {
        Self {
            key,
            energy: Some(Decimal::ZERO),
            cost: Some(Decimal::ZERO),
            paid_cost: Some(Decimal::ZERO),
            count: 0,
            exempt_count: 0,
            odometers: Vec::new(),
            members: Vec::new(),
            distance: Some(Decimal::ZERO),
        }
    }

    fn accumulate(&mut self, position: usize, record: &ChargeRecord) {
        let cost = record.cost().value();
        add(&mut self.energy, record.energy().value());
        add(&mut self.cost, cost);
        if record.exempt() {
            self.exempt_count += 1;
        } else {
            add(&mut self.paid_cost, cost);
        }
        self.count += 1;
        self.odometers.push(record.odometer().value());
        self.members.push(position);
    }

    pub fn paid_count(&self) -> usize {
        self.count - self.exempt_count
    }

    /// Cost of the exempt records.
    pub fn exempt_cost(&self) -> Option<Decimal> {
        self.cost?.checked_sub(self.paid_cost?)
    }

    pub fn max_odometer(&self) -> Option<Decimal> {
        self.odometers.iter().copied().max()
    }

    pub fn min_odometer(&self) -> Option<Decimal> {
        self.odometers.iter().copied().min()
    }
}

/// Adds `value` to a running sum, which stays `None` once it has overflowed.
pub(crate) fn add(sum: &mut Option<Decimal>, value: Decimal) {
    *sum = sum.and_then(|s| s.checked_add(value));
}

/// The bucket key for a record: its year and month, or the first seven characters of the raw date
/// when it cannot be parsed. A record is never discarded.
pub fn month_key(record: &ChargeRecord) -> String {
    match record.parsed_date() {
        Some(date) => date.format("%Y-%m").to_string(),
        None => record.date().trim().chars().take(7).collect(),
    }
}

/// Aggregates `records`, which must already be in chronological order, into monthly buckets in
/// first-seen order. The input is never re-sorted.
///
/// A bucket's distance is derived from its odometer readings:
/// - two or more readings: the highest minus the lowest.
/// - exactly one reading: that reading minus the highest reading of the previous bucket, or zero
///   when there is no previous bucket with readings.
/// - no readings: zero.
///
/// The result is not clamped, so a month may report a negative distance when the odometer
/// sequence goes backwards. Sums and distances that overflow are `None`.
pub fn aggregate_monthly(records: &[ChargeRecord]) -> Vec<MonthlyBucket> {
    let mut buckets: Vec<MonthlyBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (position, record) in records.iter().enumerate() {
        let key = month_key(record);
        let ix = match index.get(&key) {
            Some(&ix) => ix,
            None => {
                buckets.push(MonthlyBucket::new(key.clone()));
                let _ = index.insert(key, buckets.len() - 1);
                buckets.len() - 1
            }
        };
        buckets[ix].accumulate(position, record);
    }

    let mut previous_max: Option<Decimal> = None;
    for bucket in buckets.iter_mut() {
        bucket.distance = match bucket.odometers.as_slice() {
            [] => Some(Decimal::ZERO),
            [only] => previous_max.map_or(Some(Decimal::ZERO), |max| only.checked_sub(max)),
            _ => bucket
                .max_odometer()
                .zip(bucket.min_odometer())
                .and_then(|(max, min)| max.checked_sub(min)),
        };
        previous_max = bucket.max_odometer();
    }

    debug!(
        "Aggregated {} records into {} monthly buckets",
        records.len(),
        buckets.len()
    );
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChargeInput;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rec(date: &str, energy: &str, cost: &str, exempt: bool, odometer: &str) -> ChargeRecord {
        ChargeRecord::new(
            None,
            "u",
            ChargeInput {
                date: date.into(),
                energy: energy.parse().unwrap(),
                cost: cost.parse().unwrap(),
                exempt,
                odometer: odometer.parse().unwrap(),
                location: String::new(),
                notes: String::new(),
            },
        )
    }

    #[test]
    fn test_empty() {
        assert!(aggregate_monthly(&[]).is_empty());
    }

    #[test]
    fn test_sums_and_counts() {
        let records = vec![
            rec("2024-01-03", "10", "5", false, "1000"),
            rec("2024-01-20", "20", "8.5", true, "1150"),
            rec("2024-02-02", "15", "7", false, "1300"),
        ];
        let buckets = aggregate_monthly(&records);
        assert_eq!(buckets.len(), 2);

        let jan = &buckets[0];
        assert_eq!(jan.key, "2024-01");
        assert_eq!(jan.energy, Some(d("30")));
        assert_eq!(jan.cost, Some(d("13.5")));
        assert_eq!(jan.paid_cost, Some(d("5")));
        assert_eq!(jan.exempt_cost(), Some(d("8.5")));
        assert_eq!(jan.count, 2);
        assert_eq!(jan.exempt_count, 1);
        assert_eq!(jan.paid_count(), 1);
        assert_eq!(jan.odometers, vec![d("1000"), d("1150")]);
        assert_eq!(jan.distance, Some(d("150")));

        let feb = &buckets[1];
        assert_eq!(feb.key, "2024-02");
        // One reading: measured against January's highest reading.
        assert_eq!(feb.distance, Some(d("150")));
    }

    #[test]
    fn test_buckets_partition_the_input() {
        let records = vec![
            rec("2024-01-03", "1", "1", false, "1"),
            rec("2024-02-03", "1", "1", false, "2"),
            rec("2024-02-04", "1", "1", true, "3"),
            rec("garbage-date", "1", "1", false, "4"),
            rec("2024-03-01", "1", "1", false, "5"),
            rec("01/03/2024", "1", "1", false, "6"),
        ];
        let buckets = aggregate_monthly(&records);
        let mut seen: Vec<usize> = buckets.iter().flat_map(|b| b.members.clone()).collect();
        seen.sort();
        assert_eq!(seen, (0..records.len()).collect::<Vec<_>>());
        assert_eq!(
            buckets.iter().map(|b| b.count).sum::<usize>(),
            records.len()
        );
        for bucket in &buckets {
            for &m in &bucket.members {
                assert_eq!(month_key(&records[m]), bucket.key);
            }
        }
    }

    #[test]
    fn test_unparsable_date_uses_prefix() {
        let records = vec![rec("2024-13-45", "1", "1", false, "1")];
        let buckets = aggregate_monthly(&records);
        assert_eq!(buckets[0].key, "2024-13");
    }

    #[test]
    fn test_alternate_date_layout_shares_bucket() {
        let records = vec![
            rec("2024-03-01", "1", "1", false, "10"),
            rec("15/03/2024", "1", "1", false, "30"),
        ];
        let buckets = aggregate_monthly(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].distance, Some(d("20")));
    }

    #[test]
    fn test_first_bucket_with_single_reading_has_zero_distance() {
        let records = vec![rec("2024-01-03", "1", "1", false, "5000")];
        let buckets = aggregate_monthly(&records);
        assert_eq!(buckets[0].distance, Some(Decimal::ZERO));
    }

    #[test]
    fn test_bucket_distance_is_max_minus_min_regardless_of_order() {
        let records = vec![
            rec("2024-01-01", "1", "1", false, "500"),
            rec("2024-01-10", "1", "1", false, "300"),
            rec("2024-01-20", "1", "1", false, "450"),
        ];
        let buckets = aggregate_monthly(&records);
        assert_eq!(buckets[0].distance, Some(d("200")));
    }

    #[test]
    fn test_single_reading_distance_is_not_clamped() {
        let records = vec![
            rec("2024-01-01", "1", "1", false, "500"),
            rec("2024-01-10", "1", "1", false, "700"),
            rec("2024-02-10", "1", "1", false, "650"),
        ];
        let buckets = aggregate_monthly(&records);
        assert_eq!(buckets[1].distance, Some(d("-50")));
    }

    #[test]
    fn test_first_seen_order_is_preserved() {
        // Caller order wins even when it is not chronological.
        let records = vec![
            rec("2024-05-01", "1", "1", false, "1"),
            rec("2024-02-01", "1", "1", false, "2"),
        ];
        let keys: Vec<String> = aggregate_monthly(&records)
            .into_iter()
            .map(|b| b.key)
            .collect();
        assert_eq!(keys, vec!["2024-05", "2024-02"]);
    }

    #[test]
    fn test_overflowing_sums_are_unavailable() {
        let max = Decimal::MAX.to_string();
        let records = vec![
            rec("2024-01-01", &max, "1", false, &max),
            rec("2024-01-02", &max, "1", false, "0"),
            rec("2024-02-02", "1", "1", false, "-1"),
        ];
        let buckets = aggregate_monthly(&records);
        assert_eq!(buckets[0].energy, None);
        assert_eq!(buckets[0].cost, Some(d("2")));
        assert_eq!(buckets[0].distance, Some(Decimal::MAX));
        // -1 minus the highest January reading does not fit.
        assert_eq!(buckets[1].distance, None);
    }
}
