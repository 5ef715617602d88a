use crate::analytics::{
    aggregate_monthly, bucket_kpis, compute_trends, history_kpis, KpiId, KpiSet, MonthlyBucket,
    TrendEntry,
};
use crate::model::{BaselineConfig, ChargeRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// One month of the report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct MonthSummary {
    #[serde(flatten)]
    pub bucket: MonthlyBucket,
    pub kpis: KpiSet,
}

/// Everything the dashboard shows: whole-history KPIs, a per-month breakdown, and how the latest
/// month compares to the one before it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Report {
    pub totals: KpiSet,
    pub months: Vec<MonthSummary>,
    /// Trends of the last month against the month before it. Empty when there are no records.
    pub trends: BTreeMap<KpiId, TrendEntry>,
}

impl Report {
    pub fn latest_month(&self) -> Option<&MonthSummary> {
        self.months.last()
    }
}

/// Builds a report over `records`, which must be in chronological order.
pub fn build_report(records: &[ChargeRecord], baseline: Option<&BaselineConfig>) -> Report {
    let totals = history_kpis(records, baseline);
    let months: Vec<MonthSummary> = aggregate_monthly(records)
        .into_iter()
        .map(|bucket| {
            let kpis = bucket_kpis(&bucket, baseline);
            MonthSummary { bucket, kpis }
        })
        .collect();

    let trends = match months.as_slice() {
        [] => BTreeMap::new(),
        [only] => compute_trends(&only.kpis, None),
        [.., previous, current] => compute_trends(&current.kpis, Some(&previous.kpis)),
    };

    Report {
        totals,
        months,
        trends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Direction;
    use crate::model::ChargeInput;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rec(date: &str, cost: &str, odometer: &str) -> ChargeRecord {
        ChargeRecord::new(
            None,
            "u",
            ChargeInput {
                date: date.into(),
                energy: "10".parse().unwrap(),
                cost: cost.parse().unwrap(),
                exempt: false,
                odometer: odometer.parse().unwrap(),
                ..ChargeInput::default()
            },
        )
    }

    #[test]
    fn test_empty_report() {
        let report = build_report(&[], None);
        assert!(report.months.is_empty());
        assert!(report.trends.is_empty());
        assert_eq!(report.totals.get(KpiId::RecordCount), Some(Decimal::ZERO));
        assert!(report.latest_month().is_none());
    }

    #[test]
    fn test_single_month_has_no_previous() {
        let report = build_report(&[rec("2024-01-01", "10", "100")], None);
        assert_eq!(report.months.len(), 1);
        assert!(report.trends.values().all(|t| !t.has_prev));
    }

    #[test]
    fn test_trends_compare_last_two_months() {
        let records = vec![
            rec("2024-01-01", "100", "1000"),
            rec("2024-02-01", "100", "1100"),
            rec("2024-03-01", "110", "1200"),
        ];
        let baseline = BaselineConfig::new(d("6"), d("12"));
        let report = build_report(&records, Some(&baseline));

        assert_eq!(report.months.len(), 3);
        assert_eq!(report.latest_month().unwrap().bucket.key, "2024-03");
        let cost = report.trends[&KpiId::TotalCost];
        assert_eq!(cost.percent, Some(d("10")));
        assert_eq!(cost.direction, Direction::Up);
        assert_eq!(report.totals.get(KpiId::TotalDistance), Some(d("200")));
        assert_eq!(report.totals.get(KpiId::GasolineCost), Some(d("100")));
    }

    #[test]
    fn test_report_serializes() {
        let report = build_report(&[rec("2024-01-01", "10", "100")], None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["months"][0]["key"], "2024-01");
        assert!(json["totals"]["savings_total"].is_null());
        assert_eq!(json["trends"]["total_cost"]["direction"], "flat");
    }

    #[test]
    fn test_overflowing_records_do_not_panic() {
        let huge = |date: &str| {
            ChargeRecord::new(
                None,
                "u",
                ChargeInput {
                    date: date.into(),
                    energy: Decimal::MAX.into(),
                    cost: Decimal::MAX.into(),
                    odometer: "100".parse().unwrap(),
                    ..ChargeInput::default()
                },
            )
        };
        let records = vec![huge("2024-01-01"), huge("2024-01-02"), huge("2024-02-01")];
        let report = build_report(&records, None);
        assert_eq!(report.totals.get(KpiId::TotalEnergy), None);
        assert_eq!(report.months[0].kpis.get(KpiId::TotalCost), None);
        assert_eq!(report.months[1].kpis.get(KpiId::TotalCost), Some(Decimal::MAX));
        let cost = report.trends[&KpiId::TotalCost];
        assert_eq!(cost.percent, None);
        assert!(!cost.has_prev);
    }
}
