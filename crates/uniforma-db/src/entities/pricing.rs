//! Pricing entity: a concrete price list attached to one uniform.
//!
//! `base_pricing_id` is a weak back reference to the template the instance
//! was derived from. It deliberately carries no foreign-key constraint: the
//! linkage engine owns the deletion rules (detach vs cascade), and the
//! instance always owns its own copy of `tags` and `price_data`.

use crate::types::{PriceList, TagSet};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pricings")]
pub struct Model {
    /// Pricing UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning uniform, required
    pub uniform_id: Uuid,

    /// Variant tags used for read-side matching
    #[sea_orm(column_type = "Json")]
    pub tags: TagSet,

    /// Ordered size/price rows
    #[sea_orm(column_type = "Json")]
    pub price_data: PriceList,

    /// Template this instance mirrors while linked; NULL once detached
    pub base_pricing_id: Option<Uuid>,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::uniform::Entity",
        from = "Column::UniformId",
        to = "super::uniform::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Uniform,
}

impl Related<super::uniform::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uniform.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True while the instance still mirrors a template.
    pub fn is_linked(&self) -> bool {
        self.base_pricing_id.is_some()
    }
}
