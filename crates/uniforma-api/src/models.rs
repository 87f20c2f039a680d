use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use uniforma_db::entities::{base_pricing, pricing, school, uniform};
use uniforma_db::types::PriceRow;

/// Season a uniform item is worn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Season {
    Summer,
    Winter,
    /// Year-round; matched by every season filter
    All,
}

impl From<uniform::Season> for Season {
    fn from(season: uniform::Season) -> Self {
        match season {
            uniform::Season::Summer => Self::Summer,
            uniform::Season::Winter => Self::Winter,
            uniform::Season::All => Self::All,
        }
    }
}

impl From<Season> for uniform::Season {
    fn from(season: Season) -> Self {
        match season {
            Season::Summer => Self::Summer,
            Season::Winter => Self::Winter,
            Season::All => Self::All,
        }
    }
}

/// Kind of uniform item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UniformKind {
    #[serde(rename = "Sport Wear")]
    SportWear,
    #[serde(rename = "House Dress")]
    HouseDress,
    #[serde(rename = "Normal Dress")]
    NormalDress,
    Miscellaneous,
}

impl From<uniform::UniformKind> for UniformKind {
    fn from(kind: uniform::UniformKind) -> Self {
        match kind {
            uniform::UniformKind::SportWear => Self::SportWear,
            uniform::UniformKind::HouseDress => Self::HouseDress,
            uniform::UniformKind::NormalDress => Self::NormalDress,
            uniform::UniformKind::Miscellaneous => Self::Miscellaneous,
        }
    }
}

impl From<UniformKind> for uniform::UniformKind {
    fn from(kind: UniformKind) -> Self {
        match kind {
            UniformKind::SportWear => Self::SportWear,
            UniformKind::HouseDress => Self::HouseDress,
            UniformKind::NormalDress => Self::NormalDress,
            UniformKind::Miscellaneous => Self::Miscellaneous,
        }
    }
}

/// One size/price row of a price list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceEntry {
    /// Free-text size, e.g. "32" or "Free Size"
    pub size: String,
    /// Non-negative price
    pub price: f64,
}

impl From<&PriceRow> for PriceEntry {
    fn from(row: &PriceRow) -> Self {
        Self {
            size: row.size.clone(),
            price: row.price,
        }
    }
}

impl From<PriceEntry> for PriceRow {
    fn from(entry: PriceEntry) -> Self {
        Self {
            size: entry.size,
            price: entry.price,
        }
    }
}

pub fn price_rows(entries: Vec<PriceEntry>) -> Vec<PriceRow> {
    entries.into_iter().map(Into::into).collect()
}

fn price_entries(rows: &[PriceRow]) -> Vec<PriceEntry> {
    rows.iter().map(Into::into).collect()
}

// ============================================================
// Schools
// ============================================================

/// School information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<school::Model> for School {
    fn from(model: school::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            location: model.location,
            banner_image: model.banner_image,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List of schools
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchoolList {
    pub schools: Vec<School>,
    pub total: usize,
}

/// Request to create or update a school
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchoolRequest {
    pub name: String,
    #[serde(default)]
    pub location: String,
    /// Object-store reference for the banner; on update, replaces (and
    /// releases) the previous banner when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
}

/// Result of a school cascade delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteSchoolResponse {
    pub id: Uuid,
    pub uniforms_deleted: u64,
    pub pricings_deleted: u64,
}

/// Public school count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchoolCount {
    pub count: u64,
}

// ============================================================
// Uniforms
// ============================================================

/// Uniform item information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Uniform {
    pub id: Uuid,
    pub school_id: Uuid,
    pub category: String,
    pub season: Season,
    pub kind: UniformKind,
    pub class_start: i32,
    pub class_end: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<uniform::Model> for Uniform {
    fn from(model: uniform::Model) -> Self {
        Self {
            id: model.id,
            school_id: model.school_id,
            category: model.category,
            season: model.season.into(),
            kind: model.kind.into(),
            class_start: model.class_start,
            class_end: model.class_end,
            extra_info: model.extra_info,
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List of uniforms
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UniformList {
    pub uniforms: Vec<Uniform>,
    pub total: usize,
}

impl From<Vec<uniform::Model>> for UniformList {
    fn from(models: Vec<uniform::Model>) -> Self {
        let uniforms: Vec<Uniform> = models.into_iter().map(Into::into).collect();
        let total = uniforms.len();
        Self { uniforms, total }
    }
}

/// Request to create or update a uniform
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UniformRequest {
    /// School display name; an unknown name auto-creates the school
    pub school_name: String,
    pub category: String,
    pub season: Season,
    pub kind: UniformKind,
    pub class_start: i32,
    pub class_end: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Uniform write result, flagging auto-created schools
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UniformResponse {
    pub uniform: Uniform,
    /// True when the referenced school did not exist and was auto-created
    pub school_created: bool,
}

/// Result of a uniform delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteUniformResponse {
    pub id: Uuid,
    pub pricings_deleted: u64,
}

/// Query parameters for listing a school's uniforms
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UniformQuery {
    /// Restrict to a season; `All` items always match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
}

// ============================================================
// Base pricing templates
// ============================================================

/// Reusable price-list template
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BasePricing {
    pub id: Uuid,
    pub category: String,
    pub tags: Vec<String>,
    pub price_data: Vec<PriceEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<base_pricing::Model> for BasePricing {
    fn from(model: base_pricing::Model) -> Self {
        Self {
            id: model.id,
            category: model.category,
            tags: model.tags.0,
            price_data: price_entries(model.price_data.rows()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List of templates
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BasePricingList {
    pub base_pricings: Vec<BasePricing>,
    pub total: usize,
}

impl From<Vec<base_pricing::Model>> for BasePricingList {
    fn from(models: Vec<base_pricing::Model>) -> Self {
        let base_pricings: Vec<BasePricing> = models.into_iter().map(Into::into).collect();
        let total = base_pricings.len();
        Self {
            base_pricings,
            total,
        }
    }
}

/// Request to create or update a template
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BasePricingRequest {
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub price_data: Vec<PriceEntry>,
}

/// Template update result, with the propagation count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateBasePricingResponse {
    pub base_pricing: BasePricing,
    /// Linked pricing instances overwritten by this update
    pub propagated_count: u64,
}

/// Detach-delete result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetachDeleteResponse {
    pub id: Uuid,
    /// Instances transitioned to detached before the template was removed
    pub detached_count: u64,
}

/// Cascade-delete result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CascadeDeleteResponse {
    pub id: Uuid,
    /// Linked instances deleted together with the template
    pub deleted_children_count: u64,
}

// ============================================================
// Pricing instances
// ============================================================

/// Concrete price list attached to one uniform
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Pricing {
    pub id: Uuid,
    pub uniform_id: Uuid,
    pub tags: Vec<String>,
    pub price_data: Vec<PriceEntry>,
    /// Template this instance mirrors; null once detached
    pub base_pricing_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<pricing::Model> for Pricing {
    fn from(model: pricing::Model) -> Self {
        Self {
            id: model.id,
            uniform_id: model.uniform_id,
            tags: model.tags.0,
            price_data: price_entries(model.price_data.rows()),
            base_pricing_id: model.base_pricing_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// List of pricing instances
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PricingList {
    pub pricings: Vec<Pricing>,
    pub total: usize,
}

impl From<Vec<pricing::Model>> for PricingList {
    fn from(models: Vec<pricing::Model>) -> Self {
        let pricings: Vec<Pricing> = models.into_iter().map(Into::into).collect();
        let total = pricings.len();
        Self { pricings, total }
    }
}

/// Request to create or update a pricing instance
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PricingRequest {
    pub uniform_id: Uuid,
    #[serde(default)]
    pub tags: Vec<String>,
    pub price_data: Vec<PriceEntry>,
    /// Template to link to; absent or null means detached, and on update this
    /// is the explicit detach signal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_pricing_id: Option<Uuid>,
}

/// Result of a pricing delete
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletePricingResponse {
    pub id: Uuid,
}

/// Query parameters for variant resolution
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VariantQuery {
    /// Comma-separated tag selection, e.g. `tags=Premium,Cotton`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

/// Variant resolution result; `pricing` is null when nothing qualifies
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VariantResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

// ============================================================
// System
// ============================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
