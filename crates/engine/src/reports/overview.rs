use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classify::{TransactionClass, classify};
use crate::{MoneyCents, Transaction};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub total_earned: MoneyCents,
    pub total_spent: MoneyCents,
    /// Every transfer leaving an owned account, internal or external.
    pub total_transferred: MoneyCents,
    /// `total_earned - total_spent`.
    pub total_balance: MoneyCents,
}

/// Single-pass totals over `transactions` for the `owned` account set.
///
/// When `user_id` is given only that user's transactions are considered.
pub fn calculate_overview_metrics(
    transactions: &[Transaction],
    owned: &HashSet<Uuid>,
    user_id: Option<&str>,
) -> OverviewMetrics {
    let mut metrics = OverviewMetrics::default();
    for transaction in transactions
        .iter()
        .filter(|tx| user_id.is_none_or(|user| tx.belongs_to(user)))
    {
        if transaction.is_transfer() && owned.contains(&transaction.account_id) {
            metrics.total_transferred += transaction.amount;
        }
        match classify(transaction, owned) {
            Some(TransactionClass::Income | TransactionClass::ExternalTransferIn) => {
                metrics.total_earned += transaction.amount;
            }
            Some(TransactionClass::Expense | TransactionClass::ExternalTransferOut) => {
                metrics.total_spent += transaction.amount;
            }
            Some(TransactionClass::InternalTransfer) | None => {}
        }
    }
    metrics.total_balance = metrics.total_earned - metrics.total_spent;
    metrics
}
