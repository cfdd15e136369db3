//! Recurring transaction series.
//!
//! A series is a template that generates transactions on a schedule. The
//! generated transactions point back at the series through
//! `recurring_series_id`, which is how `transaction_ids` is rebuilt.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, TransactionKind,
    util::{non_negative_amount, parse_date, parse_optional_date, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Once,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Once => "once",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Valid `due_day` range: weekday 1-7 (Monday first) for weekly cadences,
    /// day-of-month 1-31 otherwise.
    fn due_day_range(self) -> Option<std::ops::RangeInclusive<u32>> {
        match self {
            Self::Once => None,
            Self::Weekly | Self::Biweekly => Some(1..=7),
            Self::Monthly | Self::Yearly => Some(1..=31),
        }
    }
}

impl TryFrom<&str> for Frequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidKind(format!("invalid frequency: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSeries {
    pub id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    /// Either [`TransactionKind::Income`] or [`TransactionKind::Expense`].
    pub kind: TransactionKind,
    pub account_id: Uuid,
    pub frequency: Frequency,
    pub due_day: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// `false` while paused.
    pub is_active: bool,
    pub total_executions: u32,
    pub failed_executions: u32,
    pub user_ids: BTreeSet<String>,
    pub transaction_ids: BTreeSet<Uuid>,
    pub group_id: Uuid,
}

impl RecurringSeries {
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < today)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_series")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub amount_minor: i64,
    pub kind: String,
    pub account_id: String,
    pub frequency: String,
    pub due_day: i32,
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_active: bool,
    pub total_executions: i32,
    pub failed_executions: i32,
    pub group_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recurring_series_users::Entity")]
    Users,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::recurring_series_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Joined rows needed to build a [`RecurringSeries`].
pub(crate) struct SeriesRow {
    pub model: Model,
    pub user_ids: BTreeSet<String>,
    pub transaction_ids: BTreeSet<Uuid>,
}

impl TryFrom<SeriesRow> for RecurringSeries {
    type Error = EngineError;

    fn try_from(row: SeriesRow) -> Result<Self, Self::Error> {
        let SeriesRow {
            model,
            user_ids,
            transaction_ids,
        } = row;

        let id = parse_uuid(&model.id, "recurring series")?;
        let kind = TransactionKind::try_from(model.kind.as_str())?;
        if kind == TransactionKind::Transfer {
            return Err(EngineError::InvalidKind(format!(
                "recurring series {id} cannot be a transfer"
            )));
        }
        let frequency = Frequency::try_from(model.frequency.as_str())?;
        let due_day = u32::try_from(model.due_day).unwrap_or(0);
        if let Some(range) = frequency.due_day_range()
            && !range.contains(&due_day)
        {
            return Err(EngineError::InvalidRecord(format!(
                "recurring series {id}: due_day {} out of range for {}",
                model.due_day,
                frequency.as_str()
            )));
        }

        Ok(Self {
            id,
            description: model.description,
            amount: non_negative_amount(model.amount_minor, "recurring series")?,
            kind,
            account_id: parse_uuid(&model.account_id, "account")?,
            frequency,
            due_day,
            start_date: parse_date(&model.start_date, "series start_date")?,
            end_date: parse_optional_date(model.end_date.as_deref(), "series end_date")?,
            is_active: model.is_active,
            total_executions: u32::try_from(model.total_executions).unwrap_or(0),
            failed_executions: u32::try_from(model.failed_executions).unwrap_or(0),
            user_ids,
            transaction_ids,
            group_id: parse_uuid(&model.group_id, "group")?,
        })
    }
}
