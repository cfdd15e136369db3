//! Category registry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// A taxonomy entry. `key` is a unique lowercase slug, `label` its display
/// name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub group_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub key: String,
    pub label: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub group_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let key = model.key.trim().to_lowercase();
        if key.is_empty() {
            return Err(EngineError::InvalidRecord(format!(
                "category {} has an empty key",
                model.id
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            key,
            label: model.label.trim().to_string(),
            icon: model.icon,
            color: model.color,
            group_id: parse_uuid(&model.group_id, "group")?,
        })
    }
}
