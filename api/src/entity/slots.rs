//! Bookable slots

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "slots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub walker_id: Uuid,
    pub starts_at: DateTimeWithTimeZone,
    /// "available" | "reserved"
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::walkers::Entity",
        from = "Column::WalkerId",
        to = "super::walkers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Walkers,
}

impl Related<super::walkers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Walkers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
