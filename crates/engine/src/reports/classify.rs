//! Transaction classification.
//!
//! Two views share the rules below:
//!
//! - [`classify`] looks at ownership: is the money entering or leaving the
//!   set of owned accounts?
//! - [`type_legs`] looks at account types: which type bucket is credited or
//!   debited?
//!
//! Both require the transaction's account to be known. A transaction on an
//! unknown account is never attributable.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Account, AccountType, MoneyCents, Transaction, TransactionKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionClass {
    Income,
    Expense,
    /// Both legs owned: money moves but the owner set is no richer or poorer.
    InternalTransfer,
    ExternalTransferIn,
    ExternalTransferOut,
}

/// Classify `transaction` against the `owned` account set.
///
/// Returns `None` when the transaction is not attributable to the owner set.
pub fn classify(transaction: &Transaction, owned: &HashSet<Uuid>) -> Option<TransactionClass> {
    let from_owned = owned.contains(&transaction.account_id);
    match transaction.kind {
        TransactionKind::Income => from_owned.then_some(TransactionClass::Income),
        TransactionKind::Expense => from_owned.then_some(TransactionClass::Expense),
        TransactionKind::Transfer => {
            let to_owned = transaction
                .to_account_id
                .is_some_and(|id| owned.contains(&id));
            match (from_owned, to_owned) {
                (true, true) => Some(TransactionClass::InternalTransfer),
                (true, false) => Some(TransactionClass::ExternalTransferOut),
                (false, true) => Some(TransactionClass::ExternalTransferIn),
                (false, false) => None,
            }
        }
    }
}

/// Ids of the accounts owned by `user_id`, or every account when `None`.
pub fn owned_account_ids(accounts: &[Account], user_id: Option<&str>) -> HashSet<Uuid> {
    accounts
        .iter()
        .filter(|account| user_id.is_none_or(|user| account.is_owned_by(user)))
        .map(|account| account.id)
        .collect()
}

/// Per-type effect of one transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TypeLegs {
    pub spent: Option<(AccountType, MoneyCents)>,
    pub earned: Option<(AccountType, MoneyCents)>,
}

/// Account lookup by id.
pub struct AccountIndex<'a> {
    by_id: HashMap<Uuid, &'a Account>,
}

impl<'a> AccountIndex<'a> {
    pub fn new(accounts: &'a [Account]) -> Self {
        Self {
            by_id: accounts.iter().map(|account| (account.id, account)).collect(),
        }
    }

    pub fn account_type(&self, id: Uuid) -> Option<AccountType> {
        self.by_id.get(&id).map(|account| account.account_type)
    }
}

/// Bucket a transaction by account type.
///
/// - income credits the account's type, expense debits it;
/// - a transfer debits the source type and credits the destination type;
///   between two accounts of the same type it is a move inside one bucket and
///   counts as neither;
/// - a transfer to an unknown account only debits the source, one from an
///   unknown account only credits the destination.
///
/// Income and expense on an unknown account yield nothing.
pub fn type_legs(transaction: &Transaction, index: &AccountIndex<'_>) -> TypeLegs {
    let source = index.account_type(transaction.account_id);
    let amount = transaction.amount;
    match transaction.kind {
        TransactionKind::Income => TypeLegs {
            earned: source.map(|source| (source, amount)),
            spent: None,
        },
        TransactionKind::Expense => TypeLegs {
            spent: source.map(|source| (source, amount)),
            earned: None,
        },
        TransactionKind::Transfer => {
            let destination = transaction
                .to_account_id
                .and_then(|id| index.account_type(id));
            if source.is_some() && source == destination {
                return TypeLegs::default();
            }
            TypeLegs {
                spent: source.map(|source| (source, amount)),
                earned: destination.map(|destination| (destination, amount)),
            }
        }
    }
}

/// Current balance per user and account type.
///
/// Every owner of an account is credited with the account's **full** balance:
/// joint accounts are not split between owners.
pub(crate) fn seed_type_balances(
    accounts: &[Account],
) -> HashMap<String, BTreeMap<AccountType, MoneyCents>> {
    let mut balances: HashMap<String, BTreeMap<AccountType, MoneyCents>> = HashMap::new();
    for account in accounts {
        for user_id in &account.user_ids {
            *balances
                .entry(user_id.clone())
                .or_default()
                .entry(account.account_type)
                .or_default() += account.balance;
        }
    }
    balances
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::*;

    fn account(id: u128, account_type: AccountType, owners: &[&str], balance: i64) -> Account {
        Account {
            id: Uuid::from_u128(id),
            name: format!("account {id}"),
            account_type,
            user_ids: owners.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
            balance: MoneyCents::new(balance),
            group_id: Uuid::nil(),
        }
    }

    fn tx(kind: TransactionKind, from: u128, to: Option<u128>, amount: i64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            description: String::new(),
            amount: MoneyCents::new(amount),
            kind,
            category: "misc".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            account_id: Uuid::from_u128(from),
            to_account_id: to.map(Uuid::from_u128),
            user_id: Some("alice".to_string()),
            group_id: Uuid::nil(),
            recurring_series_id: None,
        }
    }

    #[test]
    fn classifies_by_ownership() {
        let owned: HashSet<Uuid> = [Uuid::from_u128(1), Uuid::from_u128(2)].into();
        let cases = [
            (tx(TransactionKind::Income, 1, None, 10), Some(TransactionClass::Income)),
            (tx(TransactionKind::Expense, 1, None, 10), Some(TransactionClass::Expense)),
            (tx(TransactionKind::Income, 9, None, 10), None),
            (
                tx(TransactionKind::Transfer, 1, Some(2), 10),
                Some(TransactionClass::InternalTransfer),
            ),
            (
                tx(TransactionKind::Transfer, 1, Some(9), 10),
                Some(TransactionClass::ExternalTransferOut),
            ),
            (
                tx(TransactionKind::Transfer, 9, Some(2), 10),
                Some(TransactionClass::ExternalTransferIn),
            ),
            (tx(TransactionKind::Transfer, 8, Some(9), 10), None),
        ];
        for (transaction, expected) in cases {
            assert_eq!(classify(&transaction, &owned), expected);
        }
    }

    #[test]
    fn owned_ids_filter_by_user() {
        let accounts = vec![
            account(1, AccountType::Cash, &["alice"], 0),
            account(2, AccountType::Savings, &["alice", "bob"], 0),
            account(3, AccountType::Cash, &["bob"], 0),
        ];
        assert_eq!(owned_account_ids(&accounts, Some("alice")).len(), 2);
        assert_eq!(owned_account_ids(&accounts, Some("carol")).len(), 0);
        assert_eq!(owned_account_ids(&accounts, None).len(), 3);
    }

    #[test]
    fn transfer_legs_cross_type_buckets() {
        let accounts = vec![
            account(1, AccountType::Cash, &["alice"], 0),
            account(2, AccountType::Savings, &["alice"], 0),
            account(3, AccountType::Cash, &["alice"], 0),
        ];
        let index = AccountIndex::new(&accounts);

        let cross = type_legs(&tx(TransactionKind::Transfer, 1, Some(2), 100), &index);
        assert_eq!(cross.spent, Some((AccountType::Cash, MoneyCents::new(100))));
        assert_eq!(cross.earned, Some((AccountType::Savings, MoneyCents::new(100))));

        let same_type = type_legs(&tx(TransactionKind::Transfer, 1, Some(3), 100), &index);
        assert_eq!(same_type, TypeLegs::default());

        let outside = type_legs(&tx(TransactionKind::Transfer, 1, Some(42), 100), &index);
        assert_eq!(outside.spent, Some((AccountType::Cash, MoneyCents::new(100))));
        assert_eq!(outside.earned, None);

        let unknown_source = type_legs(&tx(TransactionKind::Income, 42, None, 100), &index);
        assert_eq!(unknown_source, TypeLegs::default());
    }

    #[test]
    fn transfer_from_unknown_account_credits_destination() {
        let accounts = vec![account(2, AccountType::Savings, &["alice"], 1_000)];
        let index = AccountIndex::new(&accounts);

        let inbound = type_legs(&tx(TransactionKind::Transfer, 77, Some(2), 300), &index);
        assert_eq!(inbound.spent, None);
        assert_eq!(inbound.earned, Some((AccountType::Savings, MoneyCents::new(300))));

        let neither = type_legs(&tx(TransactionKind::Transfer, 77, Some(78), 300), &index);
        assert_eq!(neither, TypeLegs::default());
    }

    #[test]
    fn overview_and_flows_agree_on_inbound_transfers() {
        let accounts = vec![account(2, AccountType::Savings, &["alice"], 1_000)];
        let transactions = vec![tx(TransactionKind::Transfer, 77, Some(2), 300)];

        let owned = owned_account_ids(&accounts, Some("alice"));
        let overview =
            crate::reports::calculate_overview_metrics(&transactions, &owned, Some("alice"));
        let flows = crate::reports::calculate_user_flow_summary(
            &transactions,
            &accounts,
            &["alice".to_string()],
        );
        assert_eq!(overview.total_earned, MoneyCents::new(300));
        assert_eq!(flows[0].total_earned, overview.total_earned);
    }

    #[test]
    fn joint_accounts_credit_every_owner_in_full() {
        let accounts = vec![
            account(1, AccountType::Savings, &["alice", "bob"], 1_000),
            account(2, AccountType::Savings, &["alice"], 500),
        ];
        let balances = seed_type_balances(&accounts);
        assert_eq!(balances["alice"][&AccountType::Savings], MoneyCents::new(1_500));
        assert_eq!(balances["bob"][&AccountType::Savings], MoneyCents::new(1_000));
    }
}
