//! Per-user flows bucketed by account type.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::classify::{AccountIndex, seed_type_balances, type_legs};
use crate::{Account, AccountType, MoneyCents, Transaction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowBucket {
    pub account_type: AccountType,
    pub earned: MoneyCents,
    pub spent: MoneyCents,
    pub net: MoneyCents,
    /// Current balance of the user's accounts of this type.
    pub balance: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFlowSummary {
    pub user_id: String,
    /// Sorted by balance, highest first.
    pub buckets: Vec<FlowBucket>,
    pub total_earned: MoneyCents,
    pub total_spent: MoneyCents,
    pub total_net: MoneyCents,
    pub total_balance: MoneyCents,
}

#[derive(Default)]
struct Totals {
    earned: MoneyCents,
    spent: MoneyCents,
    balance: MoneyCents,
}

/// One summary per tracked user, in the order of `user_ids`.
///
/// Duplicate and blank ids are ignored. A user without accounts or
/// transactions gets an empty bucket list.
pub fn calculate_user_flow_summary(
    transactions: &[Transaction],
    accounts: &[Account],
    user_ids: &[String],
) -> Vec<UserFlowSummary> {
    let mut seen = HashSet::new();
    let tracked: Vec<&str> = user_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .collect();

    let seeded = seed_type_balances(accounts);
    let mut buckets: HashMap<&str, BTreeMap<AccountType, Totals>> = tracked
        .iter()
        .map(|user| {
            let per_type = seeded
                .get(*user)
                .map(|balances| {
                    balances
                        .iter()
                        .map(|(account_type, balance)| {
                            (
                                *account_type,
                                Totals {
                                    balance: *balance,
                                    ..Totals::default()
                                },
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();
            (*user, per_type)
        })
        .collect();

    let index = AccountIndex::new(accounts);
    for transaction in transactions {
        let Some(per_type) = transaction
            .user_id
            .as_deref()
            .and_then(|user| buckets.get_mut(user))
        else {
            continue;
        };
        let legs = type_legs(transaction, &index);
        if let Some((account_type, amount)) = legs.spent {
            per_type.entry(account_type).or_default().spent += amount;
        }
        if let Some((account_type, amount)) = legs.earned {
            per_type.entry(account_type).or_default().earned += amount;
        }
    }

    tracked
        .into_iter()
        .map(|user| {
            let mut rows: Vec<FlowBucket> = buckets
                .remove(user)
                .unwrap_or_default()
                .into_iter()
                .map(|(account_type, totals)| FlowBucket {
                    account_type,
                    earned: totals.earned,
                    spent: totals.spent,
                    net: totals.earned - totals.spent,
                    balance: totals.balance,
                })
                .collect();
            rows.sort_by(|a, b| {
                b.balance
                    .cmp(&a.balance)
                    .then(a.account_type.cmp(&b.account_type))
            });

            let total_earned = rows.iter().map(|row| row.earned).sum();
            let total_spent = rows.iter().map(|row| row.spent).sum();
            UserFlowSummary {
                user_id: user.to_string(),
                total_earned,
                total_spent,
                total_net: total_earned - total_spent,
                total_balance: rows.iter().map(|row| row.balance).sum(),
                buckets: rows,
            }
        })
        .collect()
}
