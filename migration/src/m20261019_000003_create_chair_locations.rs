use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_chairs::Chair;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Raw report log, appended by chairs. No foreign key: unknown chairs
        // are filtered out by the ingest pipeline.
        manager
            .create_table(
                Table::create()
                    .table(ChairLocation::Table)
                    .if_not_exists()
                    .col(pk_auto(ChairLocation::Id))
                    .col(uuid(ChairLocation::ChairId).not_null())
                    .col(integer(ChairLocation::Latitude).not_null())
                    .col(integer(ChairLocation::Longitude).not_null())
                    .col(
                        timestamp_with_time_zone(ChairLocation::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LatestChairLocation::Table)
                    .if_not_exists()
                    .col(uuid(LatestChairLocation::ChairId).primary_key())
                    .col(integer(LatestChairLocation::Latitude).not_null())
                    .col(integer(LatestChairLocation::Longitude).not_null())
                    .col(
                        big_integer(LatestChairLocation::TotalDistance)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        timestamp_with_time_zone(LatestChairLocation::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_latest_chair_location_chair")
                            .from(LatestChairLocation::Table, LatestChairLocation::ChairId)
                            .to(Chair::Table, Chair::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IngestWatermark::Table)
                    .if_not_exists()
                    .col(string_len(IngestWatermark::Name, 50).primary_key())
                    .col(integer(IngestWatermark::LastId).not_null())
                    .col(
                        timestamp_with_time_zone(IngestWatermark::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IngestWatermark::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(LatestChairLocation::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ChairLocation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ChairLocation {
    Table,
    Id,
    ChairId,
    Latitude,
    Longitude,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum LatestChairLocation {
    Table,
    ChairId,
    Latitude,
    Longitude,
    TotalDistance,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum IngestWatermark {
    Table,
    Name,
    LastId,
    UpdatedAt,
}
