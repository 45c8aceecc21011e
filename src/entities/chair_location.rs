use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One raw position report. `id` is the monotonically increasing report
/// identifier the ingest watermark is measured against.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chair_location")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub chair_id: Uuid,
    pub latitude: i32,
    pub longitude: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
