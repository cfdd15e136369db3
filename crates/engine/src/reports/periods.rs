//! Budget period roll-forward.
//!
//! Account balances are only known "now". To recover what they were at each
//! period boundary the periods are walked newest first: a period ends at the
//! running balance and starts at that balance minus the period's net flow,
//! which becomes the running balance for the next (older) period.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classify::{AccountIndex, seed_type_balances, type_legs};
use crate::{
    Account, AccountType, BudgetPeriod, MoneyCents, Transaction, TransactionKind, dates::date_key,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTypeMetrics {
    pub earned: MoneyCents,
    pub spent: MoneyCents,
    pub net_change: MoneyCents,
    pub start_balance: MoneyCents,
    pub end_balance: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriodSummary {
    pub id: Uuid,
    pub user_id: String,
    pub label: String,
    pub start_date: NaiveDate,
    /// Effective end: the stored end date, or today for the open period.
    pub end_date: NaiveDate,
    pub is_open: bool,
    pub start_balance: MoneyCents,
    pub end_balance: MoneyCents,
    /// Income only; transfers never count here.
    pub total_earned: MoneyCents,
    /// Expense only; transfers never count here.
    pub total_spent: MoneyCents,
    pub metrics_by_account_type: BTreeMap<AccountType, PeriodTypeMetrics>,
}

/// `"2024-01-01 - 2024-01-31"`, or `"2024-02-01 - now"` while open.
pub fn period_label(period: &BudgetPeriod) -> String {
    match period.end_date {
        Some(end) => format!("{} - {}", date_key(period.start_date), date_key(end)),
        None => format!("{} - now", date_key(period.start_date)),
    }
}

/// Summaries for `periods`, newest first.
///
/// Each user's boundaries are chained: an older period's end balance is the
/// next period's start balance, per account type.
pub fn calculate_period_summaries(
    periods: &[BudgetPeriod],
    transactions: &[Transaction],
    accounts: &[Account],
    today: NaiveDate,
) -> Vec<ReportPeriodSummary> {
    let mut ordered: Vec<&BudgetPeriod> = periods.iter().collect();
    ordered.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));

    let index = AccountIndex::new(accounts);
    let mut running: HashMap<String, BTreeMap<AccountType, MoneyCents>> =
        seed_type_balances(accounts);

    let mut summaries = Vec::with_capacity(ordered.len());
    for period in ordered {
        let mut flows: BTreeMap<AccountType, (MoneyCents, MoneyCents)> = BTreeMap::new();
        let mut total_earned = MoneyCents::ZERO;
        let mut total_spent = MoneyCents::ZERO;

        for transaction in transactions.iter().filter(|tx| {
            tx.belongs_to(&period.user_id) && period.contains(tx.date, today)
        }) {
            let legs = type_legs(transaction, &index);
            if let Some((account_type, amount)) = legs.earned {
                flows.entry(account_type).or_default().0 += amount;
            }
            if let Some((account_type, amount)) = legs.spent {
                flows.entry(account_type).or_default().1 += amount;
            }
            if index.account_type(transaction.account_id).is_some() {
                match transaction.kind {
                    TransactionKind::Income => total_earned += transaction.amount,
                    TransactionKind::Expense => total_spent += transaction.amount,
                    TransactionKind::Transfer => {}
                }
            }
        }

        let balances = running.entry(period.user_id.clone()).or_default();
        let touched: BTreeSet<AccountType> =
            flows.keys().chain(balances.keys()).copied().collect();

        let mut metrics_by_account_type = BTreeMap::new();
        for account_type in touched {
            let (earned, spent) = flows.get(&account_type).copied().unwrap_or_default();
            let end_balance = balances.get(&account_type).copied().unwrap_or_default();
            let net_change = earned - spent;
            let start_balance = end_balance - net_change;
            balances.insert(account_type, start_balance);
            metrics_by_account_type.insert(
                account_type,
                PeriodTypeMetrics {
                    earned,
                    spent,
                    net_change,
                    start_balance,
                    end_balance,
                },
            );
        }

        summaries.push(ReportPeriodSummary {
            id: period.id,
            user_id: period.user_id.clone(),
            label: period_label(period),
            start_date: period.start_date,
            end_date: period.effective_end(today),
            is_open: period.is_open(),
            start_balance: metrics_by_account_type
                .values()
                .map(|metrics| metrics.start_balance)
                .sum(),
            end_balance: metrics_by_account_type
                .values()
                .map(|metrics| metrics.end_balance)
                .sum(),
            total_earned,
            total_spent,
            metrics_by_account_type,
        });
    }

    tracing::debug!("rolled back {} budget periods", summaries.len());
    summaries
}
