//! Report entry points.
//!
//! Each report issues its independent fetches concurrently and fails as a
//! whole if any of them fails.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Account, RecurringSeries, ResultEngine, Transaction,
    reports::{
        BudgetProgress, CategoryStats, OverviewMetrics, RecurringTotals, ReportPeriodSummary,
        SeriesHistory, SeriesSchedule, UserFlowSummary, budget_window, calculate_budget_progress,
        calculate_category_stats, calculate_overview_metrics, calculate_period_summaries,
        calculate_totals, calculate_user_flow_summary, owned_account_ids, reconcile_history,
        schedule,
    },
};

use super::{DateRange, Engine, Scope, require_user};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringReport {
    /// Soonest first.
    pub schedules: Vec<SeriesSchedule>,
    pub totals: RecurringTotals,
    pub histories: Vec<SeriesHistory>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub group_id: Uuid,
    pub user_id: String,
    pub generated_on: NaiveDate,
    pub overview: OverviewMetrics,
    pub flows: Option<UserFlowSummary>,
    pub periods: Vec<ReportPeriodSummary>,
    pub categories: CategoryStats,
    pub recurring: RecurringReport,
    pub budgets: Vec<BudgetProgress>,
}

fn account_owners(accounts: &[Account]) -> Vec<String> {
    accounts
        .iter()
        .flat_map(|account| account.user_ids.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn recurring_report(
    series: &[RecurringSeries],
    transactions: &[Transaction],
    today: NaiveDate,
) -> RecurringReport {
    let mut schedules: Vec<SeriesSchedule> = series.iter().map(|s| schedule(s, today)).collect();
    schedules.sort_by(|a, b| {
        a.next_due_date
            .cmp(&b.next_due_date)
            .then_with(|| a.description.cmp(&b.description))
    });
    RecurringReport {
        schedules,
        totals: calculate_totals(series),
        histories: series
            .iter()
            .map(|s| reconcile_history(s, transactions))
            .collect(),
    }
}

impl Engine {
    /// Group totals, or one user's totals over the accounts they own.
    pub async fn overview(
        &self,
        group_id: Uuid,
        user_id: Option<&str>,
        range: Option<DateRange>,
    ) -> ResultEngine<OverviewMetrics> {
        let user_id = user_id.map(require_user).transpose()?;
        let scope = Scope::Group(group_id);
        let (transactions, accounts) = tokio::try_join!(
            self.fetch_transactions(&scope, range),
            self.fetch_accounts(&scope),
        )?;
        let owned = owned_account_ids(&accounts, user_id.as_deref());
        Ok(calculate_overview_metrics(
            &transactions,
            &owned,
            user_id.as_deref(),
        ))
    }

    /// Per-type flows for `user_ids`, or for every account owner in the group
    /// when the list is empty.
    pub async fn user_flows(
        &self,
        group_id: Uuid,
        user_ids: &[String],
        range: Option<DateRange>,
    ) -> ResultEngine<Vec<UserFlowSummary>> {
        let scope = Scope::Group(group_id);
        let (transactions, accounts) = tokio::try_join!(
            self.fetch_transactions(&scope, range),
            self.fetch_accounts(&scope),
        )?;
        let tracked = if user_ids.is_empty() {
            account_owners(&accounts)
        } else {
            user_ids.to_vec()
        };
        let summaries = calculate_user_flow_summary(&transactions, &accounts, &tracked);
        tracing::debug!("built flow summaries for {} users", summaries.len());
        Ok(summaries)
    }

    /// Budget periods of `user_id` with rolled-back balances, newest first.
    pub async fn period_report(
        &self,
        user_id: &str,
        range: Option<DateRange>,
    ) -> ResultEngine<Vec<ReportPeriodSummary>> {
        let scope = Scope::user(user_id)?;
        // Balances roll back from today through every period, so the range
        // only selects which summaries are returned.
        let (periods, transactions, accounts) = tokio::try_join!(
            self.fetch_budget_periods(user_id, None),
            self.fetch_transactions(&scope, None),
            self.fetch_accounts(&scope),
        )?;
        let mut summaries =
            calculate_period_summaries(&periods, &transactions, &accounts, self.today());
        if let Some(range) = range {
            summaries.retain(|summary| {
                let end = (!summary.is_open).then_some(summary.end_date);
                range.overlaps(summary.start_date, end)
            });
        }
        Ok(summaries)
    }

    pub async fn category_report(
        &self,
        group_id: Uuid,
        range: Option<DateRange>,
    ) -> ResultEngine<CategoryStats> {
        let scope = Scope::Group(group_id);
        let (transactions, categories) = tokio::try_join!(
            self.fetch_transactions(&scope, range),
            self.fetch_categories(),
        )?;
        Ok(calculate_category_stats(&transactions, &categories))
    }

    pub async fn recurring_report(&self, group_id: Uuid) -> ResultEngine<RecurringReport> {
        let scope = Scope::Group(group_id);
        let (series, transactions) = tokio::try_join!(
            self.fetch_recurring_series(&scope),
            self.fetch_transactions(&scope, None),
        )?;
        Ok(recurring_report(&series, &transactions, self.today()))
    }

    /// Progress of `user_id`'s budgets in `group_id` over their current window.
    pub async fn budget_report(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<BudgetProgress>> {
        let scope = Scope::user(user_id)?;
        let (budgets, periods, transactions, categories) = tokio::try_join!(
            self.fetch_budgets(&scope),
            self.fetch_budget_periods(user_id, None),
            self.fetch_transactions(&scope, None),
            self.fetch_categories(),
        )?;
        let budgets: Vec<_> = budgets
            .into_iter()
            .filter(|budget| budget.group_id == group_id)
            .collect();
        let window = budget_window(&periods, user_id.trim(), self.today());
        Ok(calculate_budget_progress(
            &budgets,
            &transactions,
            &categories,
            window,
        ))
    }

    /// Every view for one user of a group, from a single concurrent fetch.
    pub async fn dashboard(&self, group_id: Uuid, user_id: &str) -> ResultEngine<Dashboard> {
        let user_id = require_user(user_id)?;
        let group = Scope::Group(group_id);
        let (transactions, accounts, periods, series, categories, budgets) = tokio::try_join!(
            self.fetch_transactions(&group, None),
            self.fetch_accounts(&group),
            self.fetch_budget_periods(&user_id, None),
            self.fetch_recurring_series(&group),
            self.fetch_categories(),
            self.fetch_budgets(&group),
        )?;
        let today = self.today();

        let owned = owned_account_ids(&accounts, Some(&user_id));
        let overview = calculate_overview_metrics(&transactions, &owned, Some(&user_id));
        let flows = calculate_user_flow_summary(
            &transactions,
            &accounts,
            std::slice::from_ref(&user_id),
        )
        .into_iter()
        .next();
        let window = budget_window(&periods, &user_id, today);
        // Same account set as `period_report`: only what the user owns.
        let own_accounts: Vec<Account> = accounts
            .iter()
            .filter(|account| account.is_owned_by(&user_id))
            .cloned()
            .collect();
        let periods = calculate_period_summaries(&periods, &transactions, &own_accounts, today);

        let user_transactions: Vec<_> = transactions
            .iter()
            .filter(|tx| tx.belongs_to(&user_id))
            .cloned()
            .collect();
        let categories_stats = calculate_category_stats(&user_transactions, &categories);
        let budgets: Vec<_> = budgets
            .into_iter()
            .filter(|budget| budget.user_id == user_id)
            .collect();
        let budgets = calculate_budget_progress(&budgets, &user_transactions, &categories, window);

        let user_series: Vec<_> = series
            .into_iter()
            .filter(|s| s.user_ids.is_empty() || s.user_ids.contains(&user_id))
            .collect();
        let recurring = recurring_report(&user_series, &transactions, today);

        tracing::debug!("built dashboard for {user_id} in group {group_id}");
        Ok(Dashboard {
            group_id,
            user_id,
            generated_on: today,
            overview,
            flows,
            periods,
            categories: categories_stats,
            recurring,
            budgets,
        })
    }
}
