//! Create reservations table
//!
//! At most one non-cancelled reservation may reference a slot; cancelled rows
//! stay for audit and do not count.

use sea_orm_migration::prelude::*;

use super::m20240601_000001_create_catalog::Dogs;
use super::m20240601_000002_create_slots::Slots;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::WalkerId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::DogId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::ServiceId).uuid().not_null())
                    .col(ColumnDef::new(Reservations::SlotId).uuid().not_null())
                    .col(
                        ColumnDef::new(Reservations::RequestedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::ServiceAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Reservations::PriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::PickupAddress)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::DropoffAddress)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::Notes).text())
                    .col(ColumnDef::new(Reservations::ConfirmedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Reservations::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Reservations::CancelledAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Reservations::CancelledBy).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_slot")
                            .from(Reservations::Table, Reservations::SlotId)
                            .to(Slots::Table, Slots::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reservations_dog")
                            .from(Reservations::Table, Reservations::DogId)
                            .to(Dogs::Table, Dogs::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_customer")
                    .table(Reservations::Table)
                    .col(Reservations::CustomerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_walker")
                    .table(Reservations::Table)
                    .col(Reservations::WalkerId)
                    .to_owned(),
            )
            .await?;

        // Partial indexes are not expressible through the index builder
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_reservations_active_slot \
                 ON reservations (slot_id) WHERE status <> 'cancelled'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Reservations {
    Table,
    Id,
    CustomerId,
    WalkerId,
    DogId,
    ServiceId,
    SlotId,
    RequestedAt,
    ServiceAt,
    Status,
    PriceCents,
    PickupAddress,
    DropoffAddress,
    Notes,
    ConfirmedAt,
    CompletedAt,
    CancelledAt,
    CancelledBy,
}
