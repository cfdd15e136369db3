//! Read contracts over the database.
//!
//! Every fetch decodes rows leniently: a row that fails to decode is logged
//! and skipped so the reports still run on the remaining data. Date ranges
//! are applied after decoding because stored dates are free-form text.

use std::collections::{BTreeSet, HashMap};

use sea_orm::{QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Account, Budget, BudgetPeriod, Category, RecurringSeries, ResultEngine, Transaction,
    account_users, accounts, budget_categories,
    budgets::{budget, period},
    categories, recurring_series,
    recurring_series::SeriesRow,
    recurring_series_users, transactions,
    util::decode_lenient,
};

use super::{DateRange, Engine, Scope};

impl Engine {
    /// Transactions in `scope`, oldest first.
    ///
    /// A user scope returns the transactions attributed to that user.
    pub async fn fetch_transactions(
        &self,
        scope: &Scope,
        range: Option<DateRange>,
    ) -> ResultEngine<Vec<Transaction>> {
        let query = match scope {
            Scope::Group(group_id) => transactions::Entity::find()
                .filter(transactions::Column::GroupId.eq(group_id.to_string())),
            Scope::User(user_id) => transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.as_str())),
        };
        let models = query
            .order_by_asc(transactions::Column::Id)
            .all(&self.database)
            .await?;

        let mut items = decode_lenient(models, "transaction", Transaction::try_from);
        if let Some(range) = range {
            items.retain(|tx| range.contains(tx.date));
        }
        items.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        tracing::debug!("fetched {} transactions for {scope:?}", items.len());
        Ok(items)
    }

    /// Accounts in `scope` with their full owner sets.
    ///
    /// A user scope returns the accounts that user owns, alone or jointly.
    pub async fn fetch_accounts(&self, scope: &Scope) -> ResultEngine<Vec<Account>> {
        let query = match scope {
            Scope::Group(group_id) => accounts::Entity::find()
                .filter(accounts::Column::GroupId.eq(group_id.to_string())),
            Scope::User(user_id) => {
                let owned: Vec<String> = account_users::Entity::find()
                    .filter(account_users::Column::UserId.eq(user_id.as_str()))
                    .all(&self.database)
                    .await?
                    .into_iter()
                    .map(|owner| owner.account_id)
                    .collect();
                accounts::Entity::find().filter(accounts::Column::Id.is_in(owned))
            }
        };
        let rows = query
            .order_by_asc(accounts::Column::Name)
            .find_with_related(account_users::Entity)
            .all(&self.database)
            .await?;

        let rows: Vec<(accounts::Model, BTreeSet<String>)> = rows
            .into_iter()
            .map(|(model, owners)| {
                let user_ids = owners.into_iter().map(|owner| owner.user_id).collect();
                (model, user_ids)
            })
            .collect();
        let items = decode_lenient(rows, "account", Account::try_from);
        tracing::debug!("fetched {} accounts for {scope:?}", items.len());
        Ok(items)
    }

    /// Budget periods of `user_id`, oldest first. With a range, only the
    /// periods overlapping it are returned.
    pub async fn fetch_budget_periods(
        &self,
        user_id: &str,
        range: Option<DateRange>,
    ) -> ResultEngine<Vec<BudgetPeriod>> {
        let user_id = super::require_user(user_id)?;
        let models = period::Entity::find()
            .filter(period::Column::UserId.eq(user_id.as_str()))
            .all(&self.database)
            .await?;

        let mut items = decode_lenient(models, "budget period", BudgetPeriod::try_from);
        if let Some(range) = range {
            items.retain(|p| range.overlaps(p.start_date, p.end_date));
        }
        items.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
        tracing::debug!("fetched {} budget periods for {user_id}", items.len());
        Ok(items)
    }

    /// Recurring series in `scope`, with their users and execution history.
    pub async fn fetch_recurring_series(&self, scope: &Scope) -> ResultEngine<Vec<RecurringSeries>> {
        let query = match scope {
            Scope::Group(group_id) => recurring_series::Entity::find()
                .filter(recurring_series::Column::GroupId.eq(group_id.to_string())),
            Scope::User(user_id) => {
                let linked: Vec<String> = recurring_series_users::Entity::find()
                    .filter(recurring_series_users::Column::UserId.eq(user_id.as_str()))
                    .all(&self.database)
                    .await?
                    .into_iter()
                    .map(|link| link.series_id)
                    .collect();
                recurring_series::Entity::find()
                    .filter(recurring_series::Column::Id.is_in(linked))
            }
        };
        let rows = query
            .order_by_asc(recurring_series::Column::Description)
            .find_with_related(recurring_series_users::Entity)
            .all(&self.database)
            .await?;

        let series_ids: Vec<String> = rows.iter().map(|(model, _)| model.id.clone()).collect();
        let mut history: HashMap<String, BTreeSet<Uuid>> = HashMap::new();
        for model in transactions::Entity::find()
            .filter(transactions::Column::RecurringSeriesId.is_in(series_ids))
            .all(&self.database)
            .await?
        {
            let (Some(series_id), Ok(id)) = (model.recurring_series_id, Uuid::parse_str(&model.id))
            else {
                tracing::warn!("skipping malformed history row {}", model.id);
                continue;
            };
            history.entry(series_id).or_default().insert(id);
        }

        let rows: Vec<SeriesRow> = rows
            .into_iter()
            .map(|(model, users)| SeriesRow {
                transaction_ids: history.remove(&model.id).unwrap_or_default(),
                user_ids: users.into_iter().map(|link| link.user_id).collect(),
                model,
            })
            .collect();
        let items = decode_lenient(rows, "recurring series", RecurringSeries::try_from);
        tracing::debug!("fetched {} recurring series for {scope:?}", items.len());
        Ok(items)
    }

    /// The whole category registry, by key.
    pub async fn fetch_categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Key)
            .all(&self.database)
            .await?;
        let items = decode_lenient(models, "category", Category::try_from);
        tracing::debug!("fetched {} categories", items.len());
        Ok(items)
    }

    /// Budgets in `scope` with their category keys.
    pub async fn fetch_budgets(&self, scope: &Scope) -> ResultEngine<Vec<Budget>> {
        let query = match scope {
            Scope::Group(group_id) => {
                budget::Entity::find().filter(budget::Column::GroupId.eq(group_id.to_string()))
            }
            Scope::User(user_id) => {
                budget::Entity::find().filter(budget::Column::UserId.eq(user_id.as_str()))
            }
        };
        let rows = query
            .order_by_asc(budget::Column::Description)
            .find_with_related(budget_categories::Entity)
            .all(&self.database)
            .await?;

        let rows: Vec<(budget::Model, BTreeSet<String>)> = rows
            .into_iter()
            .map(|(model, keys)| {
                let keys = keys.into_iter().map(|link| link.category_key).collect();
                (model, keys)
            })
            .collect();
        let items = decode_lenient(rows, "budget", Budget::try_from);
        tracing::debug!("fetched {} budgets for {scope:?}", items.len());
        Ok(items)
    }
}
