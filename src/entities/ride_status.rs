use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ride milestones in the order a ride passes through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatusKind {
    #[sea_orm(string_value = "MATCHING")]
    Matching,
    #[sea_orm(string_value = "ENROUTE")]
    Enroute,
    #[sea_orm(string_value = "PICKUP")]
    Pickup,
    #[sea_orm(string_value = "CARRYING")]
    Carrying,
    #[sea_orm(string_value = "ARRIVED")]
    Arrived,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

impl RideStatusKind {
    pub fn rank(self) -> u8 {
        match self {
            Self::Matching => 0,
            Self::Enroute => 1,
            Self::Pickup => 2,
            Self::Carrying => 3,
            Self::Arrived => 4,
            Self::Completed => 5,
        }
    }

    /// The milestone that must follow this one, `None` once completed.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Matching => Some(Self::Enroute),
            Self::Enroute => Some(Self::Pickup),
            Self::Pickup => Some(Self::Carrying),
            Self::Carrying => Some(Self::Arrived),
            Self::Arrived => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ride_status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ride_id: Uuid,
    pub status: RideStatusKind,
    pub created_at: DateTimeWithTimeZone,
    /// Written by the notification side once the chair has seen the event.
    pub chair_sent_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ride::Entity",
        from = "Column::RideId",
        to = "super::ride::Column::Id"
    )]
    Ride,
}

impl Related<super::ride::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ride.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
