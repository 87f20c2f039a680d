//! Template linkage engine.
//!
//! A `BasePricing` template is a reusable price list. A `Pricing` instance
//! attached to a uniform may be *linked* to a template (it carries the
//! template id and mirrors its data) or *detached* (no template reference,
//! editorially independent). The rules:
//!
//! - Updating a template propagates its tags and price rows to every linked
//!   instance as an unconditional overwrite. While linked, an instance
//!   always mirrors its template exactly after an update.
//! - Divergence is only possible by detaching: updating an instance with no
//!   template id clears the link, and nothing ever re-links automatically.
//! - Templates are deleted through exactly two operations: detach-delete
//!   (instances keep their last propagated data, link cleared) or
//!   cascade-delete (instances are removed with the template). Both resolve
//!   every reference before the template row goes away, so no dangling
//!   `base_pricing_id` can be left behind.
//!
//! Multi-document writes run inside a single transaction.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{debug, info};
use uniforma_db::entities::{base_pricing, pricing, uniform};
use uniforma_db::types::{PriceList, PriceRow, TagSet};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

const TEMPLATE: &str = "base pricing template";
const PRICING: &str = "pricing";
const UNIFORM: &str = "uniform";

/// Input for creating or updating a template.
#[derive(Debug, Clone)]
pub struct TemplateInput {
    pub category: String,
    pub tags: Vec<String>,
    pub price_data: Vec<PriceRow>,
}

/// Input for creating or updating a pricing instance.
///
/// `base_pricing_id: None` means detached; on update this is the explicit
/// "detach now" signal.
#[derive(Debug, Clone)]
pub struct PricingInput {
    pub uniform_id: Uuid,
    pub tags: Vec<String>,
    pub price_data: Vec<PriceRow>,
    pub base_pricing_id: Option<Uuid>,
}

fn validate_price_rows(rows: &[PriceRow]) -> CoreResult<()> {
    if rows.is_empty() {
        return Err(CoreError::validation(
            "price_data",
            "at least one size/price row is required",
        ));
    }
    for row in rows {
        if row.size.trim().is_empty() {
            return Err(CoreError::validation("size", "size is required"));
        }
        if !row.price.is_finite() || row.price < 0.0 {
            return Err(CoreError::validation(
                "price",
                "price must be a non-negative number",
            ));
        }
    }
    Ok(())
}

fn validate_category(category: &str) -> CoreResult<()> {
    if category.trim().is_empty() {
        return Err(CoreError::validation("category", "category is required"));
    }
    Ok(())
}

// ============================================================
// Template CRUD + propagation
// ============================================================

pub async fn create_template(
    db: &DatabaseConnection,
    input: TemplateInput,
) -> CoreResult<base_pricing::Model> {
    validate_category(&input.category)?;
    validate_price_rows(&input.price_data)?;

    let now = Utc::now();
    let template = base_pricing::ActiveModel {
        id: Set(Uuid::new_v4()),
        category: Set(input.category.trim().to_string()),
        tags: Set(TagSet::from(input.tags)),
        price_data: Set(PriceList::from(input.price_data)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(template = %template.id, category = %template.category, "Created base pricing template");
    Ok(template)
}

pub async fn get_template(db: &DatabaseConnection, id: Uuid) -> CoreResult<base_pricing::Model> {
    base_pricing::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found(TEMPLATE, id))
}

pub async fn list_templates(db: &DatabaseConnection) -> CoreResult<Vec<base_pricing::Model>> {
    Ok(base_pricing::Entity::find()
        .order_by_asc(base_pricing::Column::Category)
        .all(db)
        .await?)
}

/// Templates whose category matches exactly. Used by clients to offer only
/// relevant templates when pricing a uniform of that category.
pub async fn list_templates_by_category(
    db: &DatabaseConnection,
    category: &str,
) -> CoreResult<Vec<base_pricing::Model>> {
    Ok(base_pricing::Entity::find()
        .filter(base_pricing::Column::Category.eq(category))
        .all(db)
        .await?)
}

/// Replace a template's data and propagate to every linked instance.
///
/// Propagation is an unconditional overwrite of `tags` and `price_data` on
/// all pricings still carrying this template's id; their `base_pricing_id`
/// is untouched. Returns the updated template and the propagated count.
pub async fn update_template(
    db: &DatabaseConnection,
    id: Uuid,
    input: TemplateInput,
) -> CoreResult<(base_pricing::Model, u64)> {
    validate_category(&input.category)?;
    validate_price_rows(&input.price_data)?;

    let txn = db.begin().await?;

    let existing = base_pricing::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| CoreError::not_found(TEMPLATE, id))?;

    let now = Utc::now();
    let mut active: base_pricing::ActiveModel = existing.into();
    active.category = Set(input.category.trim().to_string());
    active.tags = Set(TagSet::from(input.tags));
    active.price_data = Set(PriceList::from(input.price_data));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    let propagated = pricing::Entity::update_many()
        .col_expr(pricing::Column::Tags, Expr::value(updated.tags.clone()))
        .col_expr(
            pricing::Column::PriceData,
            Expr::value(updated.price_data.clone()),
        )
        .col_expr(pricing::Column::UpdatedAt, Expr::value(now))
        .filter(pricing::Column::BasePricingId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    txn.commit().await?;

    info!(template = %id, propagated, "Updated template and propagated to linked pricings");
    Ok((updated, propagated))
}

// ============================================================
// Template deletion: the only two sanctioned modes
// ============================================================

/// Retire a template but keep its consumers: every linked instance is
/// detached (link cleared, data kept as last propagated), then the template
/// row is deleted. Returns the detached count.
pub async fn detach_delete_template(db: &DatabaseConnection, id: Uuid) -> CoreResult<u64> {
    let txn = db.begin().await?;

    base_pricing::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| CoreError::not_found(TEMPLATE, id))?;

    let detached = pricing::Entity::update_many()
        .col_expr(
            pricing::Column::BasePricingId,
            Expr::value(Option::<Uuid>::None),
        )
        .col_expr(pricing::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(pricing::Column::BasePricingId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    base_pricing::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    info!(template = %id, detached, "Detach-deleted template");
    Ok(detached)
}

/// Remove a template and everything built from it: every linked instance is
/// deleted, then the template row. Returns the deleted instance count.
pub async fn cascade_delete_template(db: &DatabaseConnection, id: Uuid) -> CoreResult<u64> {
    let txn = db.begin().await?;

    base_pricing::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| CoreError::not_found(TEMPLATE, id))?;

    let deleted = pricing::Entity::delete_many()
        .filter(pricing::Column::BasePricingId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    base_pricing::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    info!(template = %id, deleted, "Cascade-deleted template and linked pricings");
    Ok(deleted)
}

// ============================================================
// Pricing CRUD
// ============================================================

/// A supplied template reference must resolve. Unknown ids are rejected
/// rather than stored as silent orphans.
async fn check_references(db: &DatabaseConnection, input: &PricingInput) -> CoreResult<()> {
    uniform::Entity::find_by_id(input.uniform_id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found(UNIFORM, input.uniform_id))?;

    if let Some(template_id) = input.base_pricing_id {
        base_pricing::Entity::find_by_id(template_id)
            .one(db)
            .await?
            .ok_or_else(|| CoreError::not_found(TEMPLATE, template_id))?;
    }

    Ok(())
}

pub async fn create_pricing(
    db: &DatabaseConnection,
    input: PricingInput,
) -> CoreResult<pricing::Model> {
    validate_price_rows(&input.price_data)?;
    check_references(db, &input).await?;

    let now = Utc::now();
    let created = pricing::ActiveModel {
        id: Set(Uuid::new_v4()),
        uniform_id: Set(input.uniform_id),
        tags: Set(TagSet::from(input.tags)),
        price_data: Set(PriceList::from(input.price_data)),
        base_pricing_id: Set(input.base_pricing_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(
        pricing = %created.id,
        uniform = %created.uniform_id,
        linked = created.is_linked(),
        "Created pricing"
    );
    Ok(created)
}

/// The single mutation path through which a linked instance detaches:
/// an input with `base_pricing_id: None` clears the link.
pub async fn update_pricing(
    db: &DatabaseConnection,
    id: Uuid,
    input: PricingInput,
) -> CoreResult<pricing::Model> {
    validate_price_rows(&input.price_data)?;

    let existing = pricing::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found(PRICING, id))?;

    check_references(db, &input).await?;

    let was_linked = existing.is_linked();
    let mut active: pricing::ActiveModel = existing.into();
    active.uniform_id = Set(input.uniform_id);
    active.tags = Set(TagSet::from(input.tags));
    active.price_data = Set(PriceList::from(input.price_data));
    active.base_pricing_id = Set(input.base_pricing_id);
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    if was_linked && !updated.is_linked() {
        debug!(pricing = %id, "Pricing detached from its template");
    }
    Ok(updated)
}

pub async fn delete_pricing(db: &DatabaseConnection, id: Uuid) -> CoreResult<Uuid> {
    let existing = pricing::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found(PRICING, id))?;

    pricing::Entity::delete_by_id(existing.id).exec(db).await?;
    Ok(id)
}

pub async fn get_pricing(db: &DatabaseConnection, id: Uuid) -> CoreResult<pricing::Model> {
    pricing::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found(PRICING, id))
}

/// Every pricing across all uniforms. Powers the admin overview.
pub async fn list_pricings(db: &DatabaseConnection) -> CoreResult<Vec<pricing::Model>> {
    Ok(pricing::Entity::find().all(db).await?)
}

pub async fn list_pricings_for_uniform(
    db: &DatabaseConnection,
    uniform_id: Uuid,
) -> CoreResult<Vec<pricing::Model>> {
    Ok(pricing::Entity::find()
        .filter(pricing::Column::UniformId.eq(uniform_id))
        .all(db)
        .await?)
}

// ============================================================
// Variant resolution (read-side matching)
// ============================================================

/// Pick the single best-matching pricing for a uniform and a selected tag
/// set.
///
/// Qualifiers are pricings whose tag set is a superset of the selection (an
/// empty selection matches everything). Among qualifiers the one with the
/// fewest tags wins, the most general match, so incidental tags on richer
/// variants don't over-match. Ties on tag count break on smallest id, which
/// keeps the result deterministic. No qualifier is a valid empty result,
/// not an error.
pub async fn resolve_variant(
    db: &DatabaseConnection,
    uniform_id: Uuid,
    selected: &[String],
) -> CoreResult<Option<pricing::Model>> {
    let candidates = list_pricings_for_uniform(db, uniform_id).await?;

    Ok(candidates
        .into_iter()
        .filter(|p| p.tags.is_superset_of(selected))
        .min_by_key(|p| (p.tags.len(), p.id)))
}
