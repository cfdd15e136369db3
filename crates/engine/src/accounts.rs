//! The module contains `Account` and the normalized `AccountType`.

use std::collections::BTreeSet;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, util::parse_uuid};

/// Normalized account type used to bucket balances and flows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Cash,
    Savings,
    Investments,
    Payroll,
    Other,
}

impl AccountType {
    /// Map a stored type (any case, surrounding spaces allowed) to its bucket.
    ///
    /// `investment` and `investments` share a bucket; anything unknown is
    /// [`AccountType::Other`].
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "cash" => Self::Cash,
            "savings" => Self::Savings,
            "investment" | "investments" => Self::Investments,
            "payroll" => Self::Payroll,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Savings => "savings",
            Self::Investments => "investments",
            Self::Payroll => "payroll",
            Self::Other => "other",
        }
    }
}

impl core::fmt::Display for AccountType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A money container.
///
/// An account can be jointly owned: `user_ids` lists every owner. `balance`
/// is the current snapshot maintained upstream and is treated as opaque.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub user_ids: BTreeSet<String>,
    pub balance: MoneyCents,
    pub group_id: Uuid,
}

impl Account {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_ids.contains(user_id)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub balance_minor: i64,
    pub group_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::account_users::Entity")]
    AccountUsers,
}

impl Related<super::account_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<(Model, BTreeSet<String>)> for Account {
    type Error = EngineError;

    fn try_from((model, user_ids): (Model, BTreeSet<String>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            name: model.name,
            account_type: AccountType::normalize(&model.account_type),
            user_ids,
            balance: MoneyCents::new(model.balance_minor),
            group_id: parse_uuid(&model.group_id, "group")?,
        })
    }
}
