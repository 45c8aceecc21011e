use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_chairs::Chair;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ride::Table)
                    .if_not_exists()
                    .col(uuid(Ride::Id).primary_key())
                    .col(integer(Ride::PickupLatitude).not_null())
                    .col(integer(Ride::PickupLongitude).not_null())
                    .col(integer(Ride::DestinationLatitude).not_null())
                    .col(integer(Ride::DestinationLongitude).not_null())
                    .col(uuid_null(Ride::ChairId))
                    .col(
                        timestamp_with_time_zone(Ride::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Ride::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_chair")
                            .from(Ride::Table, Ride::ChairId)
                            .to(Chair::Table, Chair::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ride_chair_id")
                    .table(Ride::Table)
                    .col(Ride::ChairId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ride_waiting")
                    .table(Ride::Table)
                    .col(Ride::ChairId)
                    .col(Ride::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RideStatus::Table)
                    .if_not_exists()
                    .col(uuid(RideStatus::Id).primary_key())
                    .col(uuid(RideStatus::RideId).not_null())
                    .col(string_len(RideStatus::Status, 16).not_null())
                    .col(
                        timestamp_with_time_zone(RideStatus::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(RideStatus::ChairSentAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_status_ride")
                            .from(RideStatus::Table, RideStatus::RideId)
                            .to(Ride::Table, Ride::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ride_status_ride_created")
                    .table(RideStatus::Table)
                    .col(RideStatus::RideId)
                    .col(RideStatus::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RideStatus::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Ride::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ride {
    Table,
    Id,
    PickupLatitude,
    PickupLongitude,
    DestinationLatitude,
    DestinationLongitude,
    ChairId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum RideStatus {
    Table,
    Id,
    RideId,
    Status,
    CreatedAt,
    ChairSentAt,
}
