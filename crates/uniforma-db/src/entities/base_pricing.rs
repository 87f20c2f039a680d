//! BasePricing entity: reusable price-list template keyed by category.
//!
//! A template is an independent document: it is not owned by any uniform,
//! and deleting one must go through the linkage engine so dangling
//! `base_pricing_id` references on pricing instances get resolved.

use crate::types::{PriceList, TagSet};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "base_pricings")]
pub struct Model {
    /// Template UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Uniform category this template applies to, e.g. "Shirt"
    pub category: String,

    /// Descriptive tags copied to linked instances on propagation
    #[sea_orm(column_type = "Json")]
    pub tags: TagSet,

    /// Ordered size/price rows copied to linked instances on propagation
    #[sea_orm(column_type = "Json")]
    pub price_data: PriceList,

    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
