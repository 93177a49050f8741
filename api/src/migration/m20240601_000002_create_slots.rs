//! Create slots table
//!
//! A walker has at most one slot per start time.

use sea_orm_migration::prelude::*;

use super::m20240601_000001_create_catalog::Walkers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Slots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Slots::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Slots::WalkerId).uuid().not_null())
                    .col(
                        ColumnDef::new(Slots::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Slots::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Slots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_slots_walker")
                            .from(Slots::Table, Slots::WalkerId)
                            .to(Walkers::Table, Walkers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_slots_walker_starts_at")
                    .table(Slots::Table)
                    .col(Slots::WalkerId)
                    .col(Slots::StartsAt)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Slots::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Slots {
    Table,
    Id,
    WalkerId,
    StartsAt,
    Status,
    CreatedAt,
}
