use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::geo::Coordinate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ride")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pickup_latitude: i32,
    pub pickup_longitude: i32,
    pub destination_latitude: i32,
    pub destination_longitude: i32,
    /// Set once by the dispatcher, never cleared.
    pub chair_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn pickup(&self) -> Coordinate {
        Coordinate::new(self.pickup_latitude, self.pickup_longitude)
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
    #[sea_orm(has_many = "super::ride_status::Entity")]
    Statuses,
}

impl Related<super::chair::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chair.def()
    }
}

impl Related<super::ride_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Statuses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
