//! School entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schools")]
pub struct Model {
    /// School UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name as entered by the operator
    pub name: String,

    /// Lowercased name, unique. Gives case-insensitive uniqueness at the
    /// storage layer so concurrent find-or-create cannot race into
    /// duplicates.
    #[sea_orm(unique)]
    pub name_key: String,

    /// Free-text location, empty for auto-created schools
    pub location: String,

    /// Object-store reference of the banner image, if any
    pub banner_image: Option<String>,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A school owns its uniforms
    #[sea_orm(has_many = "super::uniform::Entity")]
    Uniforms,
}

impl Related<super::uniform::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uniforms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Canonical uniqueness key for a school name.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
