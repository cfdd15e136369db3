//! Pure report calculators.
//!
//! Every function here works on already-decoded records and never fails:
//! empty input yields an empty or all-zero result.

pub mod budgets;
pub mod categories;
pub mod classify;
pub mod flows;
pub mod overview;
pub mod periods;
pub mod recurring;

pub use budgets::{BudgetProgress, BudgetWindow, budget_window, calculate_budget_progress};
pub use categories::{
    CategoryIndex, CategoryResolution, CategoryStat, CategoryStats, UNCATEGORIZED,
    calculate_category_stats, resolve_category,
};
pub use classify::{
    AccountIndex, TransactionClass, TypeLegs, classify, owned_account_ids, type_legs,
};
pub use flows::{FlowBucket, UserFlowSummary, calculate_user_flow_summary};
pub use overview::{OverviewMetrics, calculate_overview_metrics};
pub use periods::{
    PeriodTypeMetrics, ReportPeriodSummary, calculate_period_summaries, period_label,
};
pub use recurring::{
    RecurringTotals, SeriesHistory, SeriesSchedule, SeriesStatus, calculate_monthly_amount,
    calculate_totals, days_until_due, is_series_due, next_execution_date, reconcile_history,
    schedule, series_status,
};
