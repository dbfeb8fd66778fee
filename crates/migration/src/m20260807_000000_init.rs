//! Initial schema migration - creates all tables from scratch.
//!
//! - `rides`: usage intervals with odometer readings and participants
//! - `costs`: variable cost events (fuel, insurance, other)
//! - `wear_payments`: contributions to the wear reserve
//! - `config`: key/value rows (currently only the wear rate)
//!
//! Users are a static compiled-in roster, so there is no user table; rows
//! reference them by id.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Rides {
    Table,
    Id,
    UserId,
    ParticipantIds,
    StartKm,
    EndKm,
    StartedAt,
    EndedAt,
    EndLat,
    EndLng,
}

#[derive(Iden)]
enum Costs {
    Table,
    Id,
    UserId,
    Amount,
    Kind,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum WearPayments {
    Table,
    Id,
    UserId,
    Amount,
    CreatedAt,
}

#[derive(Iden)]
enum Config {
    Table,
    Key,
    Value,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rides::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rides::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Rides::UserId).string().not_null())
                    .col(ColumnDef::new(Rides::ParticipantIds).string())
                    .col(ColumnDef::new(Rides::StartKm).double().not_null())
                    .col(ColumnDef::new(Rides::EndKm).double())
                    .col(ColumnDef::new(Rides::StartedAt).timestamp().not_null())
                    .col(ColumnDef::new(Rides::EndedAt).timestamp())
                    .col(ColumnDef::new(Rides::EndLat).double())
                    .col(ColumnDef::new(Rides::EndLng).double())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-rides-started_at")
                    .table(Rides::Table)
                    .col(Rides::StartedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-rides-end_km")
                    .table(Rides::Table)
                    .col(Rides::EndKm)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Costs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Costs::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Costs::UserId).string().not_null())
                    .col(ColumnDef::new(Costs::Amount).double().not_null())
                    .col(ColumnDef::new(Costs::Kind).string().not_null())
                    .col(ColumnDef::new(Costs::Description).string())
                    .col(ColumnDef::new(Costs::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-costs-user_id")
                    .table(Costs::Table)
                    .col(Costs::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WearPayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WearPayments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(WearPayments::UserId).string().not_null())
                    .col(ColumnDef::new(WearPayments::Amount).double().not_null())
                    .col(
                        ColumnDef::new(WearPayments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wear_payments-user_id")
                    .table(WearPayments::Table)
                    .col(WearPayments::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Config::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Config::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Config::Value).string().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Config::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WearPayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Costs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rides::Table).to_owned())
            .await?;
        Ok(())
    }
}
