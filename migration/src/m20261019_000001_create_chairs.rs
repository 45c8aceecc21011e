use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChairModel::Table)
                    .if_not_exists()
                    .col(string_len(ChairModel::Name, 50).primary_key())
                    .col(integer(ChairModel::Speed).not_null())
                    .to_owned(),
            )
            .await?;

        // Seed chair models
        let insert = Query::insert()
            .into_table(ChairModel::Table)
            .columns([ChairModel::Name, ChairModel::Speed])
            .values_panic(["Standard".into(), 2.into()])
            .values_panic(["Cruiser".into(), 3.into()])
            .values_panic(["Swift".into(), 5.into()])
            .values_panic(["Blaze".into(), 7.into()])
            .to_owned();

        manager.exec_stmt(insert).await?;

        manager
            .create_table(
                Table::create()
                    .table(Chair::Table)
                    .if_not_exists()
                    .col(uuid(Chair::Id).primary_key())
                    .col(string_len(Chair::Name, 100).not_null())
                    .col(string_len(Chair::Model, 50).not_null())
                    .col(boolean(Chair::IsActive).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(Chair::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chair_model")
                            .from(Chair::Table, Chair::Model)
                            .to(ChairModel::Table, ChairModel::Name)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Chair::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ChairModel::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum ChairModel {
    Table,
    Name,
    Speed,
}

#[derive(DeriveIden)]
pub enum Chair {
    Table,
    Id,
    Name,
    Model,
    IsActive,
    CreatedAt,
}
