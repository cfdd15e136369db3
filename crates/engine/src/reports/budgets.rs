use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::categories::CategoryIndex;
use crate::{
    Budget, BudgetKind, BudgetPeriod, Category, MoneyCents, Transaction, TransactionKind,
    dates::month_bounds,
};

/// Inclusive date window a budget is measured over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BudgetWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// The user's open period up to today, or the current calendar month when no
/// period is open.
pub fn budget_window(periods: &[BudgetPeriod], user_id: &str, today: NaiveDate) -> BudgetWindow {
    periods
        .iter()
        .filter(|period| period.user_id == user_id && period.is_open())
        .max_by_key(|period| period.start_date)
        .map(|period| BudgetWindow {
            start: period.start_date,
            end: period.effective_end(today),
        })
        .unwrap_or_else(|| {
            let (start, end) = month_bounds(today);
            BudgetWindow { start, end }
        })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub budget_id: Uuid,
    pub description: String,
    pub kind: BudgetKind,
    pub user_id: String,
    pub window: BudgetWindow,
    pub limit: MoneyCents,
    pub spent: MoneyCents,
    /// Negative once the budget is overspent.
    pub remaining: MoneyCents,
    /// `spent / limit` in basis points; 0 for a zero limit.
    pub used_basis_points: i64,
    pub over_budget: bool,
}

/// Spending against each budget inside `window`.
///
/// Only the budget owner's expenses count, and only when the transaction's
/// resolved category key is one of the budget's categories. An annual budget
/// is measured against a twelfth of its amount.
pub fn calculate_budget_progress(
    budgets: &[Budget],
    transactions: &[Transaction],
    categories: &[Category],
    window: BudgetWindow,
) -> Vec<BudgetProgress> {
    let index = CategoryIndex::new(categories);
    let in_window: Vec<(&Transaction, String)> = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense && window.contains(tx.date))
        .map(|tx| (tx, index.resolve(&tx.category).key()))
        .collect();

    let mut progress: Vec<BudgetProgress> = budgets
        .iter()
        .map(|budget| {
            let spent: MoneyCents = in_window
                .iter()
                .filter(|(tx, key)| tx.belongs_to(&budget.user_id) && budget.categories.contains(key))
                .map(|(tx, _)| tx.amount)
                .sum();
            let limit = budget.monthly_limit();
            BudgetProgress {
                budget_id: budget.id,
                description: budget.description.clone(),
                kind: budget.kind,
                user_id: budget.user_id.clone(),
                window,
                limit,
                spent,
                remaining: limit - spent,
                used_basis_points: spent.basis_points_of(limit),
                over_budget: spent > limit,
            }
        })
        .collect();
    progress.sort_by(|a, b| {
        b.used_basis_points
            .cmp(&a.used_basis_points)
            .then_with(|| a.description.cmp(&b.description))
    });
    progress
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget(kind: BudgetKind, amount: i64, categories: &[&str]) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            description: format!("{} budget", kind.as_str()),
            amount: MoneyCents::new(amount),
            kind,
            categories: categories.iter().map(ToString::to_string).collect::<BTreeSet<_>>(),
            user_id: "alice".to_string(),
            group_id: Uuid::nil(),
        }
    }

    fn expense(category: &str, amount: i64, date: NaiveDate, user: &str) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            description: String::new(),
            amount: MoneyCents::new(amount),
            kind: TransactionKind::Expense,
            category: category.to_string(),
            date,
            account_id: Uuid::from_u128(1),
            to_account_id: None,
            user_id: Some(user.to_string()),
            group_id: Uuid::nil(),
            recurring_series_id: None,
        }
    }

    #[test]
    fn open_period_sets_the_window() {
        let today = ymd(2024, 3, 20);
        let periods = vec![
            BudgetPeriod {
                id: Uuid::from_u128(1),
                start_date: ymd(2024, 3, 5),
                end_date: None,
                user_id: "alice".to_string(),
            },
            BudgetPeriod {
                id: Uuid::from_u128(2),
                start_date: ymd(2024, 2, 5),
                end_date: Some(ymd(2024, 3, 4)),
                user_id: "alice".to_string(),
            },
        ];
        let window = budget_window(&periods, "alice", today);
        assert_eq!(window.start, ymd(2024, 3, 5));
        assert_eq!(window.end, today);

        let fallback = budget_window(&periods, "bob", today);
        assert_eq!(fallback.start, ymd(2024, 3, 1));
        assert_eq!(fallback.end, ymd(2024, 3, 31));
    }

    #[test]
    fn counts_owner_expenses_in_covered_categories() {
        let categories = vec![Category {
            id: Uuid::from_u128(9),
            key: "groceries".to_string(),
            label: "Groceries".to_string(),
            icon: None,
            color: None,
            group_id: Uuid::nil(),
        }];
        let window = BudgetWindow {
            start: ymd(2024, 3, 1),
            end: ymd(2024, 3, 31),
        };
        let txs = vec![
            expense("Groceries", 150_00, ymd(2024, 3, 2), "alice"),
            expense(&Uuid::from_u128(9).to_string(), 100_00, ymd(2024, 3, 9), "alice"),
            expense("groceries", 70_00, ymd(2024, 3, 9), "bob"),
            expense("groceries", 80_00, ymd(2024, 2, 28), "alice"),
            expense("fuel", 40_00, ymd(2024, 3, 3), "alice"),
        ];
        let budgets = vec![
            budget(BudgetKind::Monthly, 200_00, &["groceries"]),
            budget(BudgetKind::Annually, 1_200_00, &["fuel"]),
        ];

        let progress = calculate_budget_progress(&budgets, &txs, &categories, window);
        let monthly = &progress[0];
        assert_eq!(monthly.kind, BudgetKind::Monthly);
        assert_eq!(monthly.spent, MoneyCents::new(250_00));
        assert_eq!(monthly.remaining, MoneyCents::new(-50_00));
        assert_eq!(monthly.used_basis_points, 12_500);
        assert!(monthly.over_budget);

        let annual = &progress[1];
        assert_eq!(annual.limit, MoneyCents::new(100_00));
        assert_eq!(annual.spent, MoneyCents::new(40_00));
        assert_eq!(annual.used_basis_points, 4_000);
        assert!(!annual.over_budget);
    }
}
