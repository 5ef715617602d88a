//! Pure functions over an in-memory, chronologically ordered list of charge records. Nothing in
//! here touches storage.

mod kpi;
mod monthly;
mod report;
mod trend;

pub use kpi::{
    bucket_kpis, compute_kpis, history_distance, history_kpis, KpiId, KpiInput, KpiSet,
};
pub use monthly::{aggregate_monthly, month_key, MonthlyBucket};
pub use report::{build_report, MonthSummary, Report};
pub use trend::{compute_trends, Direction, TrendEntry};
