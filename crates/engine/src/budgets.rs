//! Budgets and budget periods.
//!
//! A [`Budget`] is a spending envelope over a set of categories. A
//! [`BudgetPeriod`] is one bounded window during which a user's budgets are
//! tracked; the open period has no end date.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents,
    util::{non_negative_amount, parse_date, parse_optional_date, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    Monthly,
    Annually,
}

impl BudgetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annually => "annually",
        }
    }
}

impl TryFrom<&str> for BudgetKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Self::Monthly),
            "annually" | "annual" | "yearly" => Ok(Self::Annually),
            other => Err(EngineError::InvalidKind(format!("invalid budget kind: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub description: String,
    /// Target for one month (`Monthly`) or one year (`Annually`).
    pub amount: MoneyCents,
    pub kind: BudgetKind,
    /// Lowercase category keys covered by the budget.
    pub categories: BTreeSet<String>,
    pub user_id: String,
    pub group_id: Uuid,
}

impl Budget {
    /// Target for a single month.
    pub fn monthly_limit(&self) -> MoneyCents {
        match self.kind {
            BudgetKind::Monthly => self.amount,
            BudgetKind::Annually => self.amount.scale(1, 12),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetPeriod {
    pub id: Uuid,
    pub start_date: NaiveDate,
    /// `None` while the period is open.
    pub end_date: Option<NaiveDate>,
    pub user_id: String,
}

impl BudgetPeriod {
    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }

    /// Last day covered, using `today` for the open period.
    pub fn effective_end(&self, today: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(today)
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        date >= self.start_date && date <= self.effective_end(today)
    }
}

pub mod budget {
    //! `budgets` table.
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "budgets")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub description: String,
        pub amount_minor: i64,
        pub kind: String,
        pub user_id: String,
        pub group_id: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "crate::budget_categories::Entity")]
        BudgetCategories,
    }

    impl Related<crate::budget_categories::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::BudgetCategories.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod period {
    //! `budget_periods` table.
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "budget_periods")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub start_date: String,
        pub end_date: Option<String>,
        pub user_id: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl TryFrom<(budget::Model, BTreeSet<String>)> for Budget {
    type Error = EngineError;

    fn try_from(
        (model, categories): (budget::Model, BTreeSet<String>),
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "budget")?,
            description: model.description,
            amount: non_negative_amount(model.amount_minor, "budget")?,
            kind: BudgetKind::try_from(model.kind.as_str())?,
            categories: categories
                .into_iter()
                .map(|key| key.trim().to_lowercase())
                .filter(|key| !key.is_empty())
                .collect(),
            user_id: model.user_id.trim().to_string(),
            group_id: parse_uuid(&model.group_id, "group")?,
        })
    }
}

impl TryFrom<period::Model> for BudgetPeriod {
    type Error = EngineError;

    fn try_from(model: period::Model) -> Result<Self, Self::Error> {
        let period = Self {
            id: parse_uuid(&model.id, "budget period")?,
            start_date: parse_date(&model.start_date, "period start_date")?,
            end_date: parse_optional_date(model.end_date.as_deref(), "period end_date")?,
            user_id: model.user_id.trim().to_string(),
        };
        if let Some(end) = period.end_date
            && end < period.start_date
        {
            return Err(EngineError::InvalidRecord(format!(
                "budget period {} ends before it starts",
                period.id
            )));
        }
        Ok(period)
    }
}
