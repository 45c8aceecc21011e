use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chair_model")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub speed: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::chair::Entity")]
    Chairs,
}

impl Related<super::chair::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chairs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
