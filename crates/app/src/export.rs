//! Rendering of engine reports as JSON or CSV.

use csv::Writer;
use engine::{
    Dashboard, RecurringReport,
    reports::{BudgetProgress, CategoryStats, OverviewMetrics, ReportPeriodSummary, UserFlowSummary},
};
use serde::Serialize;

use crate::{
    cli::OutputFormat,
    error::{AppError, Result},
};

/// One report ready to print.
#[derive(Debug)]
pub enum View {
    Overview(OverviewMetrics),
    Flows(Vec<UserFlowSummary>),
    Periods(Vec<ReportPeriodSummary>),
    Categories(CategoryStats),
    Recurring(RecurringReport),
    Budgets(Vec<BudgetProgress>),
    Dashboard(Box<Dashboard>),
}

impl View {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => self.to_json(),
            OutputFormat::Csv => self.to_csv(),
        }
    }

    fn to_json(&self) -> Result<String> {
        let json = match self {
            Self::Overview(metrics) => serde_json::to_string_pretty(metrics)?,
            Self::Flows(summaries) => serde_json::to_string_pretty(summaries)?,
            Self::Periods(periods) => serde_json::to_string_pretty(periods)?,
            Self::Categories(stats) => serde_json::to_string_pretty(stats)?,
            Self::Recurring(report) => serde_json::to_string_pretty(report)?,
            Self::Budgets(progress) => serde_json::to_string_pretty(progress)?,
            Self::Dashboard(dashboard) => serde_json::to_string_pretty(dashboard)?,
        };
        Ok(json)
    }

    fn to_csv(&self) -> Result<String> {
        match self {
            Self::Overview(metrics) => write_rows([OverviewRow::from(metrics)]),
            Self::Flows(summaries) => write_rows(summaries.iter().flat_map(flow_rows)),
            Self::Periods(periods) => write_rows(periods.iter().flat_map(period_rows)),
            Self::Categories(stats) => write_rows(category_rows(stats)),
            Self::Recurring(report) => write_rows(report.schedules.iter().map(|s| ScheduleRow {
                series_id: s.series_id.to_string(),
                description: &s.description,
                frequency: s.frequency.as_str(),
                kind: s.kind.as_str(),
                amount: s.amount.to_string(),
                next_due_date: s.next_due_date.to_string(),
                days_until_due: s.days_until_due,
                is_due: s.is_due,
            })),
            Self::Budgets(progress) => write_rows(progress.iter().map(|p| BudgetRow {
                budget_id: p.budget_id.to_string(),
                description: &p.description,
                kind: p.kind.as_str(),
                window_start: p.window.start.to_string(),
                window_end: p.window.end.to_string(),
                limit: p.limit.to_string(),
                spent: p.spent.to_string(),
                remaining: p.remaining.to_string(),
                used_basis_points: p.used_basis_points,
                over_budget: p.over_budget,
            })),
            Self::Dashboard(_) => Err(AppError::Export(
                "the dashboard is only available as json".to_string(),
            )),
        }
    }
}

fn write_rows<R: Serialize>(rows: impl IntoIterator<Item = R>) -> Result<String> {
    let mut writer = Writer::from_writer(vec![]);
    for row in rows {
        writer.serialize(row)?;
    }
    let data = writer
        .into_inner()
        .map_err(|err| AppError::Export(format!("failed to finalize csv: {err}")))?;
    String::from_utf8(data).map_err(|err| AppError::Export(err.to_string()))
}

#[derive(Serialize)]
struct OverviewRow {
    total_earned: String,
    total_spent: String,
    total_transferred: String,
    total_balance: String,
}

impl From<&OverviewMetrics> for OverviewRow {
    fn from(metrics: &OverviewMetrics) -> Self {
        Self {
            total_earned: metrics.total_earned.to_string(),
            total_spent: metrics.total_spent.to_string(),
            total_transferred: metrics.total_transferred.to_string(),
            total_balance: metrics.total_balance.to_string(),
        }
    }
}

#[derive(Serialize)]
struct FlowRow<'a> {
    user_id: &'a str,
    account_type: &'static str,
    earned: String,
    spent: String,
    net: String,
    balance: String,
}

fn flow_rows(summary: &UserFlowSummary) -> impl Iterator<Item = FlowRow<'_>> {
    summary.buckets.iter().map(|bucket| FlowRow {
        user_id: &summary.user_id,
        account_type: bucket.account_type.as_str(),
        earned: bucket.earned.to_string(),
        spent: bucket.spent.to_string(),
        net: bucket.net.to_string(),
        balance: bucket.balance.to_string(),
    })
}

/// One row per period and account type.
#[derive(Serialize)]
struct PeriodRow<'a> {
    period_id: String,
    label: &'a str,
    is_open: bool,
    account_type: &'static str,
    start_balance: String,
    earned: String,
    spent: String,
    end_balance: String,
}

fn period_rows(period: &ReportPeriodSummary) -> impl Iterator<Item = PeriodRow<'_>> {
    period
        .metrics_by_account_type
        .iter()
        .map(|(account_type, metrics)| PeriodRow {
            period_id: period.id.to_string(),
            label: &period.label,
            is_open: period.is_open,
            account_type: account_type.as_str(),
            start_balance: metrics.start_balance.to_string(),
            earned: metrics.earned.to_string(),
            spent: metrics.spent.to_string(),
            end_balance: metrics.end_balance.to_string(),
        })
}

#[derive(Serialize)]
struct CategoryRow<'a> {
    direction: &'static str,
    category_id: &'a str,
    label: &'a str,
    total: String,
    count: usize,
    unresolved: bool,
}

fn category_rows(stats: &CategoryStats) -> impl Iterator<Item = CategoryRow<'_>> {
    let income = stats.income.iter().map(|stat| ("income", stat));
    let expense = stats.expense.iter().map(|stat| ("expense", stat));
    income.chain(expense).map(|(direction, stat)| CategoryRow {
        direction,
        category_id: &stat.category_id,
        label: &stat.label,
        total: stat.total.to_string(),
        count: stat.count,
        unresolved: stat.unresolved,
    })
}

#[derive(Serialize)]
struct ScheduleRow<'a> {
    series_id: String,
    description: &'a str,
    frequency: &'static str,
    kind: &'static str,
    amount: String,
    next_due_date: String,
    days_until_due: i64,
    is_due: bool,
}

#[derive(Serialize)]
struct BudgetRow<'a> {
    budget_id: String,
    description: &'a str,
    kind: &'static str,
    window_start: String,
    window_end: String,
    limit: String,
    spent: String,
    remaining: String,
    used_basis_points: i64,
    over_budget: bool,
}

#[cfg(test)]
mod tests {
    use engine::{
        AccountType, MoneyCents,
        reports::{CategoryStat, FlowBucket},
    };

    use super::*;

    fn stat(id: &str, label: &str, total: i64) -> CategoryStat {
        CategoryStat {
            category_id: id.to_string(),
            key: id.to_string(),
            label: label.to_string(),
            icon: None,
            color: None,
            total: MoneyCents::new(total),
            count: 1,
            unresolved: false,
        }
    }

    #[test]
    fn overview_csv_has_header_and_one_row() {
        let view = View::Overview(OverviewMetrics {
            total_earned: MoneyCents::new(500_00),
            total_spent: MoneyCents::new(150_00),
            total_transferred: MoneyCents::new(0),
            total_balance: MoneyCents::new(350_00),
        });
        let csv = view.render(OutputFormat::Csv).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "total_earned,total_spent,total_transferred,total_balance",
                "500.00,150.00,0.00,350.00",
            ]
        );
    }

    #[test]
    fn category_csv_lists_income_before_expense() {
        let view = View::Categories(CategoryStats {
            income: vec![stat("salary", "Salary", 1_000_00)],
            expense: vec![stat("food", "Food", 42_50)],
        });
        let csv = view.render(OutputFormat::Csv).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("income,salary,Salary,1000.00"));
        assert!(lines[2].starts_with("expense,food,Food,42.50"));
    }

    #[test]
    fn flows_csv_has_one_row_per_bucket() {
        let view = View::Flows(vec![UserFlowSummary {
            user_id: "alice".to_string(),
            buckets: vec![FlowBucket {
                account_type: AccountType::Savings,
                earned: MoneyCents::new(100_00),
                spent: MoneyCents::ZERO,
                net: MoneyCents::new(100_00),
                balance: MoneyCents::new(100_00),
            }],
            total_earned: MoneyCents::new(100_00),
            total_spent: MoneyCents::ZERO,
            total_net: MoneyCents::new(100_00),
            total_balance: MoneyCents::new(100_00),
        }]);
        let csv = view.render(OutputFormat::Csv).unwrap();
        assert_eq!(csv.lines().nth(1), Some("alice,savings,100.00,0.00,100.00,100.00"));
    }

    #[test]
    fn json_keeps_cents_as_integers() {
        let view = View::Overview(OverviewMetrics {
            total_earned: MoneyCents::new(12_34),
            ..OverviewMetrics::default()
        });
        let json = view.render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_earned"], 1234);
    }

    #[test]
    fn empty_lists_render_as_empty_csv() {
        let csv = View::Budgets(Vec::new()).render(OutputFormat::Csv).unwrap();
        assert!(csv.is_empty());
    }
}
