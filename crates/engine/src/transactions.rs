//! Transaction primitives.
//!
//! A `Transaction` is an immutable financial event on one account, or on two
//! accounts for transfers.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine,
    util::{non_negative_amount, normalize_user_id, parse_date, parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::InvalidKind(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub kind: TransactionKind,
    /// Raw category reference: a category id or key, as written upstream.
    pub category: String,
    pub date: NaiveDate,
    pub account_id: Uuid,
    /// Destination account; set only for transfers.
    pub to_account_id: Option<Uuid>,
    /// Attributed user. Some transactions are unattributed.
    pub user_id: Option<String>,
    pub group_id: Uuid,
    pub recurring_series_id: Option<Uuid>,
}

impl Transaction {
    /// Checks the transfer invariant: `to_account_id` is set iff the kind is
    /// [`TransactionKind::Transfer`].
    pub fn validate(&self) -> ResultEngine<()> {
        match (self.kind, self.to_account_id) {
            (TransactionKind::Transfer, None) => Err(EngineError::InvalidRecord(format!(
                "transfer {} has no destination account",
                self.id
            ))),
            (TransactionKind::Income | TransactionKind::Expense, Some(_)) => {
                Err(EngineError::InvalidRecord(format!(
                    "{} {} has a destination account",
                    self.kind.as_str(),
                    self.id
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn is_transfer(&self) -> bool {
        self.kind == TransactionKind::Transfer
    }

    pub fn belongs_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    pub amount_minor: i64,
    pub kind: String,
    pub category: String,
    pub date: String,
    pub account_id: String,
    pub to_account_id: Option<String>,
    pub user_id: Option<String>,
    pub group_id: String,
    pub recurring_series_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recurring_series::Entity",
        from = "Column::RecurringSeriesId",
        to = "super::recurring_series::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    RecurringSeries,
}

impl Related<super::recurring_series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringSeries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let transaction = Self {
            id: parse_uuid(&model.id, "transaction")?,
            description: model.description,
            amount: non_negative_amount(model.amount_minor, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            category: model.category.trim().to_string(),
            date: parse_date(&model.date, "transaction date")?,
            account_id: parse_uuid(&model.account_id, "account")?,
            to_account_id: parse_optional_uuid(model.to_account_id.as_deref(), "to_account")?,
            user_id: normalize_user_id(model.user_id.as_deref()),
            group_id: parse_uuid(&model.group_id, "group")?,
            recurring_series_id: parse_optional_uuid(
                model.recurring_series_id.as_deref(),
                "recurring series",
            )?,
        };
        transaction.validate()?;
        Ok(transaction)
    }
}
