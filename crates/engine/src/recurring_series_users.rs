//! Users associated with a recurring series.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "recurring_series_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub series_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recurring_series::Entity",
        from = "Column::SeriesId",
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
