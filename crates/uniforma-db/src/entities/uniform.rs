//! Uniform entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Season a uniform item is worn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Season {
    #[sea_orm(string_value = "Summer")]
    Summer,

    #[sea_orm(string_value = "Winter")]
    Winter,

    /// Worn year-round; matched by every season filter
    #[sea_orm(string_value = "All")]
    All,
}

/// Kind of uniform item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum UniformKind {
    #[sea_orm(string_value = "Sport Wear")]
    SportWear,

    #[sea_orm(string_value = "House Dress")]
    HouseDress,

    #[sea_orm(string_value = "Normal Dress")]
    NormalDress,

    #[sea_orm(string_value = "Miscellaneous")]
    Miscellaneous,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "uniforms")]
pub struct Model {
    /// Uniform UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning school. A uniform cannot outlive its school.
    pub school_id: Uuid,

    /// Item category, e.g. "Shirt", "Pant", "Skirt"
    pub category: String,

    pub season: Season,

    pub kind: UniformKind,

    /// First class/grade the item applies to
    pub class_start: i32,

    /// Last class/grade the item applies to
    pub class_end: i32,

    /// Free-text care or sizing notes, e.g. "Wash cold only"
    #[sea_orm(column_type = "Text", nullable)]
    pub extra_info: Option<String>,

    /// Object-store reference of the item image, if any
    pub image_url: Option<String>,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::school::Entity",
        from = "Column::SchoolId",
        to = "super::school::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    School,

    /// Price lists attached to this uniform
    #[sea_orm(has_many = "super::pricing::Entity")]
    Pricings,
}

impl Related<super::school::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::School.def()
    }
}

impl Related<super::pricing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pricings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
