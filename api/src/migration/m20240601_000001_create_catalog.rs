//! Create walkers, dogs and walker_services
//!
//! Read-only to the booking core; maintained by the marketplace side.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Walkers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Walkers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Walkers::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(Walkers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Dogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Dogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Dogs::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Dogs::Name).string().not_null())
                    .col(
                        ColumnDef::new(Dogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dogs_owner")
                    .table(Dogs::Table)
                    .col(Dogs::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalkerServices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalkerServices::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WalkerServices::WalkerId).uuid().not_null())
                    .col(ColumnDef::new(WalkerServices::ServiceId).uuid().not_null())
                    .col(
                        ColumnDef::new(WalkerServices::PriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalkerServices::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_walker_services_walker")
                            .from(WalkerServices::Table, WalkerServices::WalkerId)
                            .to(Walkers::Table, Walkers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_walker_services_walker_service")
                    .table(WalkerServices::Table)
                    .col(WalkerServices::WalkerId)
                    .col(WalkerServices::ServiceId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WalkerServices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Dogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Walkers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Walkers {
    Table,
    Id,
    DisplayName,
    CreatedAt,
}

#[derive(Iden)]
pub enum Dogs {
    Table,
    Id,
    OwnerId,
    Name,
    CreatedAt,
}

#[derive(Iden)]
pub enum WalkerServices {
    Table,
    Id,
    WalkerId,
    ServiceId,
    PriceCents,
    UpdatedAt,
}
