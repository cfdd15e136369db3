//! Recurring series scheduling, monthly projections and execution history.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Frequency, MoneyCents, RecurringSeries, Transaction, TransactionKind,
    dates::{clamp_to_month, next_month},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesStatus {
    Paused,
    Ended,
    NotYetDue,
    Due,
    Overdue,
}

/// Next date `series` should execute, never before `today`.
///
/// - weekly and biweekly: the next `due_day` weekday strictly after today;
/// - monthly: this month if today's day is before `due_day`, else next month,
///   clamped to the month's length;
/// - yearly: the `start_date` month at `due_day`, this year if still ahead,
///   else next year;
/// - once: `start_date` if it is in the future, else today.
pub fn next_execution_date(series: &RecurringSeries, today: NaiveDate) -> NaiveDate {
    match series.frequency {
        Frequency::Weekly => next_weekday(series.due_day, today, 7),
        Frequency::Biweekly => next_weekday(series.due_day, today, 14),
        Frequency::Monthly => {
            let (year, month) = if today.day() < series.due_day {
                (today.year(), today.month())
            } else {
                next_month(today.year(), today.month())
            };
            clamp_to_month(year, month, series.due_day).unwrap_or(today)
        }
        Frequency::Yearly => {
            let month = series.start_date.month();
            match clamp_to_month(today.year(), month, series.due_day) {
                Some(this_year) if this_year > today => this_year,
                _ => clamp_to_month(today.year() + 1, month, series.due_day).unwrap_or(today),
            }
        }
        Frequency::Once => series.start_date.max(today),
    }
}

fn next_weekday(due_day: u32, today: NaiveDate, cadence: i64) -> NaiveDate {
    let mut days = i64::from(due_day) - i64::from(today.weekday().number_from_monday());
    if days <= 0 {
        days += cadence;
    }
    today + Duration::days(days)
}

pub fn days_until_due(series: &RecurringSeries, today: NaiveDate) -> i64 {
    (next_execution_date(series, today) - today).num_days()
}

/// Active, not ended, and scheduled for today or earlier.
pub fn is_series_due(series: &RecurringSeries, today: NaiveDate) -> bool {
    series.is_active && !series.has_ended(today) && next_execution_date(series, today) <= today
}

pub fn series_status(series: &RecurringSeries, today: NaiveDate) -> SeriesStatus {
    if !series.is_active {
        return SeriesStatus::Paused;
    }
    if series.has_ended(today) {
        return SeriesStatus::Ended;
    }
    match days_until_due(series, today) {
        days if days < 0 => SeriesStatus::Overdue,
        0 => SeriesStatus::Due,
        _ => SeriesStatus::NotYetDue,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSchedule {
    pub series_id: Uuid,
    pub description: String,
    pub frequency: Frequency,
    pub kind: TransactionKind,
    pub amount: MoneyCents,
    pub next_due_date: NaiveDate,
    pub days_until_due: i64,
    pub is_due: bool,
    pub status: SeriesStatus,
}

pub fn schedule(series: &RecurringSeries, today: NaiveDate) -> SeriesSchedule {
    let next_due_date = next_execution_date(series, today);
    SeriesSchedule {
        series_id: series.id,
        description: series.description.clone(),
        frequency: series.frequency,
        kind: series.kind,
        amount: series.amount,
        next_due_date,
        days_until_due: (next_due_date - today).num_days(),
        is_due: is_series_due(series, today),
        status: series_status(series, today),
    }
}

/// Monthly-equivalent amount: weekly x4.33, biweekly x2.17, yearly /12.
///
/// A one-off series has no monthly projection.
pub fn calculate_monthly_amount(series: &RecurringSeries) -> MoneyCents {
    match series.frequency {
        Frequency::Weekly => series.amount.scale(433, 100),
        Frequency::Biweekly => series.amount.scale(217, 100),
        Frequency::Monthly => series.amount,
        Frequency::Yearly => series.amount.scale(1, 12),
        Frequency::Once => MoneyCents::ZERO,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTotals {
    pub monthly_income: MoneyCents,
    pub monthly_expense: MoneyCents,
    /// `monthly_income - monthly_expense`.
    pub monthly_net: MoneyCents,
    pub active_count: usize,
    pub paused_count: usize,
}

/// Sum of [`calculate_monthly_amount`] over active series, split by kind.
pub fn calculate_totals(series: &[RecurringSeries]) -> RecurringTotals {
    let mut totals = RecurringTotals::default();
    for item in series {
        if !item.is_active {
            totals.paused_count += 1;
            continue;
        }
        totals.active_count += 1;
        let monthly = calculate_monthly_amount(item);
        match item.kind {
            TransactionKind::Income => totals.monthly_income += monthly,
            TransactionKind::Expense => totals.monthly_expense += monthly,
            TransactionKind::Transfer => {}
        }
    }
    totals.monthly_net = totals.monthly_income - totals.monthly_expense;
    totals
}

/// How a series' recorded history lines up with the transactions at hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesHistory {
    pub series_id: Uuid,
    /// History ids found among the transactions, oldest first.
    pub executed: Vec<Uuid>,
    /// History ids with no matching transaction.
    pub missing: Vec<Uuid>,
    /// Transactions pointing at the series but absent from its history.
    pub orphaned: Vec<Uuid>,
    pub last_executed_on: Option<NaiveDate>,
    pub executed_total: MoneyCents,
    /// `total_executions` equals the number of executed transactions.
    pub counters_consistent: bool,
}

pub fn reconcile_history(series: &RecurringSeries, transactions: &[Transaction]) -> SeriesHistory {
    let by_id: HashMap<Uuid, &Transaction> = transactions.iter().map(|tx| (tx.id, tx)).collect();

    let mut executed: Vec<&Transaction> = series
        .transaction_ids
        .iter()
        .filter_map(|id| by_id.get(id).copied())
        .collect();
    executed.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let missing = series
        .transaction_ids
        .iter()
        .filter(|id| !by_id.contains_key(id))
        .copied()
        .collect();
    let orphaned: BTreeSet<Uuid> = transactions
        .iter()
        .filter(|tx| {
            tx.recurring_series_id == Some(series.id) && !series.transaction_ids.contains(&tx.id)
        })
        .map(|tx| tx.id)
        .collect();

    SeriesHistory {
        series_id: series.id,
        last_executed_on: executed.last().map(|tx| tx.date),
        executed_total: executed.iter().map(|tx| tx.amount).sum(),
        counters_consistent: usize::try_from(series.total_executions)
            .is_ok_and(|count| count == executed.len()),
        executed: executed.iter().map(|tx| tx.id).collect(),
        missing,
        orphaned: orphaned.into_iter().collect(),
    }
}
