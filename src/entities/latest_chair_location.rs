use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::geo::Coordinate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "latest_chair_location")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub chair_id: Uuid,
    pub latitude: i32,
    pub longitude: i32,
    pub total_distance: i64,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chair::Entity",
        from = "Column::ChairId",
        to = "super::chair::Column::Id"
    )]
    Chair,
}

impl Related<super::chair::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chair.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
