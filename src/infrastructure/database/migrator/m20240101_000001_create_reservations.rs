//! Create reservations table
//!
//! Charger and user ids reference records owned by sibling services, so
//! there are no foreign keys; both are indexed for filtered listings.

use sea_orm_migration::prelude::*;

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
                            .string_len(24)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Reservations::ChargerId)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reservations::UserId)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Reservations::FromTime).string().not_null())
                    .col(ColumnDef::new(Reservations::ToTime).string().not_null())
                    .col(ColumnDef::new(Reservations::Created).string().not_null())
                    .col(ColumnDef::new(Reservations::Modified).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_charger")
                    .table(Reservations::Table)
                    .col(Reservations::ChargerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_user")
                    .table(Reservations::Table)
                    .col(Reservations::UserId)
                    .to_owned(),
            )
            .await
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
    ChargerId,
    UserId,
    FromTime,
    ToTime,
    Created,
    Modified,
}
