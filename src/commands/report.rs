use crate::analytics::{build_report, KpiId, Report};
use crate::commands::Out;
use crate::format::{kpi_label, FormatConfig};
use crate::{Config, Result};
use std::fmt::Write;
use tracing::debug;

/// KPIs shown on each month's line.
const MONTH_COLUMNS: [KpiId; 5] = [
    KpiId::RecordCount,
    KpiId::TotalEnergy,
    KpiId::TotalCost,
    KpiId::TotalDistance,
    KpiId::EnergyPer100Distance,
];

/// Builds the report over all of the configured user's charges.
pub async fn report(config: Config) -> Result<Out<Report>> {
    let records = config.db().fetch_records(config.user()).await?;
    let baseline = config.db().fetch_baseline(config.user()).await?;
    if baseline.is_none() {
        debug!("No baseline for user '{}', savings are unavailable", config.user());
    }
    let report = build_report(&records, baseline.as_ref());
    let message = render(config.format(), &report);
    Ok(Out::new(message, report))
}

fn render(format: &FormatConfig, report: &Report) -> String {
    let mut s = String::new();
    if report.months.is_empty() {
        s.push_str("No charges yet");
        return s;
    }

    s.push_str("Totals");
    for (id, value) in report.totals.iter() {
        let _ = write!(s, "\n  {}: {}", kpi_label(id), format.kpi(id, value));
    }

    s.push_str("\nMonths");
    for month in &report.months {
        let _ = write!(s, "\n  {}", month.bucket.key);
        for id in MONTH_COLUMNS {
            let _ = write!(s, " | {}", format.kpi(id, month.kpis.get(id)));
        }
        if month.kpis.is_available(KpiId::SavingsTotal) {
            let _ = write!(
                s,
                " | saved {}",
                format.kpi(KpiId::SavingsTotal, month.kpis.get(KpiId::SavingsTotal))
            );
        }
    }

    if let Some(latest) = report.latest_month() {
        let _ = write!(s, "\nLatest month {}", latest.bucket.key);
        for (id, trend) in &report.trends {
            let _ = write!(
                s,
                "\n  {}: {} ({})",
                kpi_label(*id),
                format.kpi(*id, latest.kpis.get(*id)),
                format.trend(trend)
            );
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::BaselineArgs;
    use crate::commands::baseline;
    use crate::test::TestEnv;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_report_empty() {
        let env = TestEnv::new().await;
        let out = report(env.config()).await.unwrap();
        assert_eq!(out.message(), "No charges yet");
        assert!(out.structure().unwrap().months.is_empty());
    }

    #[tokio::test]
    async fn test_report_with_baseline() {
        let env = TestEnv::new().await;
        let _ = env.insert("2024-01-01", "40", "100", "1000").await;
        let _ = env.insert("2024-01-20", "40", "100", "1400").await;
        let _ = env.insert("2024-02-10", "40", "110", "1800").await;
        let args = BaselineArgs::new(Some("6".parse().unwrap()), Some("10".parse().unwrap()));
        let _ = baseline(env.config(), &args).await.unwrap();

        let out = report(env.config()).await.unwrap();
        let report = out.structure().unwrap();
        let d = |s: &str| Decimal::from_str(s).unwrap();

        assert_eq!(report.months.len(), 2);
        assert_eq!(report.totals.get(KpiId::TotalDistance), Some(d("800")));
        // 800 / 10 * 6 = 480 on gasoline against 310 on electricity
        assert_eq!(report.totals.get(KpiId::SavingsTotal), Some(d("170")));
        assert_eq!(
            report.trends[&KpiId::TotalCost].percent,
            Some(d("-45"))
        );

        let message = out.message();
        assert!(message.contains("Savings: R$170.00"), "{message}");
        assert!(message.contains("2024-02 | 1 |"), "{message}");
        assert!(message.contains("Latest month 2024-02"), "{message}");
    }

    #[tokio::test]
    async fn test_report_without_baseline_shows_unavailable() {
        let env = TestEnv::new().await;
        let _ = env.insert("2024-01-01", "40", "100", "1000").await;
        let out = report(env.config()).await.unwrap();
        assert!(out.message().contains("Savings: n/a"), "{}", out.message());
    }
}
