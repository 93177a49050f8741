//! Reservations; never deleted

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub walker_id: Uuid,
    pub dog_id: Uuid,
    pub service_id: Uuid,
    pub slot_id: Uuid,
    pub requested_at: DateTimeWithTimeZone,
    pub service_at: DateTimeWithTimeZone,
    /// "pending" | "confirmed" | "completed" | "cancelled"
    pub status: String,
    pub price_cents: i64,
    pub pickup_address: String,
    pub dropoff_address: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub confirmed_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub cancelled_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::slots::Entity",
        from = "Column::SlotId",
        to = "super::slots::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Slots,
    #[sea_orm(
        belongs_to = "super::dogs::Entity",
        from = "Column::DogId",
        to = "super::dogs::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Dogs,
}

impl Related<super::slots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slots.def()
    }
}

impl Related<super::dogs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Dogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
