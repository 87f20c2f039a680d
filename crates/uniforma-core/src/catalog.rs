//! Catalog service: school and uniform CRUD orchestration.
//!
//! Owns the dependency-ordered cascade deletes (pricings, then uniforms,
//! then the school) and the best-effort release of external image assets.
//! Database deletes run in one transaction; asset deletes happen after
//! commit and never roll anything back.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uniforma_db::entities::{pricing, school, uniform};
use uniforma_db::entities::uniform::{Season, UniformKind};
use uuid::Uuid;

use crate::assets::{self, AssetStore};
use crate::error::{CoreError, CoreResult};

const SCHOOL: &str = "school";
const UNIFORM: &str = "uniform";

#[derive(Debug, Clone)]
pub struct SchoolInput {
    pub name: String,
    pub location: String,
    /// New banner reference; `None` keeps the current banner on update
    pub banner_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UniformInput {
    /// School display name; an unknown name auto-creates the school
    pub school_name: String,
    pub category: String,
    pub season: Season,
    pub kind: UniformKind,
    pub class_start: i32,
    pub class_end: i32,
    pub extra_info: Option<String>,
    /// New image reference; `None` keeps the current image on update
    pub image_url: Option<String>,
}

/// Row counts removed by a school cascade delete.
#[derive(Debug, Clone, Copy)]
pub struct SchoolDeletion {
    pub uniforms_deleted: u64,
    pub pricings_deleted: u64,
}

fn validate_name(name: &str) -> CoreResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation("name", "name is required"));
    }
    Ok(trimmed)
}

fn validate_category(category: &str) -> CoreResult<&str> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(CoreError::validation("category", "category is required"));
    }
    Ok(trimmed)
}

async fn find_by_name_key(
    db: &DatabaseConnection,
    key: &str,
) -> CoreResult<Option<school::Model>> {
    Ok(school::Entity::find()
        .filter(school::Column::NameKey.eq(key))
        .one(db)
        .await?)
}

// ============================================================
// Schools
// ============================================================

pub async fn create_school(
    db: &DatabaseConnection,
    input: SchoolInput,
) -> CoreResult<school::Model> {
    let name = validate_name(&input.name)?;
    let key = school::name_key(name);

    if find_by_name_key(db, &key).await?.is_some() {
        return Err(CoreError::Conflict("School already exists".to_string()));
    }

    let now = Utc::now();
    let created = school::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        name_key: Set(key),
        location: Set(input.location),
        banner_image: Set(input.banner_image),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(school = %created.id, name = %created.name, "Created school");
    Ok(created)
}

/// Find a school by case-insensitive name, creating it with an empty
/// location when absent. The boolean reports `created` vs `found` so the
/// caller can inform the operator about auto-created schools.
pub async fn find_or_create_school(
    db: &DatabaseConnection,
    name: &str,
) -> CoreResult<(school::Model, bool)> {
    let name = validate_name(name)?;
    let key = school::name_key(name);

    if let Some(existing) = find_by_name_key(db, &key).await? {
        return Ok((existing, false));
    }

    let now = Utc::now();
    let created = school::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        name_key: Set(key),
        location: Set(String::new()),
        banner_image: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(school = %created.id, name = %created.name, "Auto-created school");
    Ok((created, true))
}

pub async fn get_school(db: &DatabaseConnection, id: Uuid) -> CoreResult<school::Model> {
    school::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found(SCHOOL, id))
}

pub async fn list_schools(db: &DatabaseConnection) -> CoreResult<Vec<school::Model>> {
    Ok(school::Entity::find()
        .order_by_asc(school::Column::NameKey)
        .all(db)
        .await?)
}

pub async fn count_schools(db: &DatabaseConnection) -> CoreResult<u64> {
    Ok(school::Entity::find().count(db).await?)
}

pub async fn update_school(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    id: Uuid,
    input: SchoolInput,
) -> CoreResult<school::Model> {
    let name = validate_name(&input.name)?;
    let key = school::name_key(name);

    let existing = get_school(db, id).await?;

    if key != existing.name_key && find_by_name_key(db, &key).await?.is_some() {
        return Err(CoreError::Conflict("School already exists".to_string()));
    }

    let old_banner = existing.banner_image.clone();
    let replacing_banner = input.banner_image.is_some();

    let mut active: school::ActiveModel = existing.into();
    active.name = Set(name.to_string());
    active.name_key = Set(key);
    active.location = Set(input.location);
    if let Some(banner) = input.banner_image {
        active.banner_image = Set(Some(banner));
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    if replacing_banner {
        if let Some(old) = old_banner {
            assets::release(assets, &old).await;
        }
    }

    Ok(updated)
}

/// Delete a school and its whole subtree, in dependency order: pricings of
/// each owned uniform, then the uniforms, then the school row. Image assets
/// are released after the transaction commits.
pub async fn delete_school(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    id: Uuid,
) -> CoreResult<SchoolDeletion> {
    let school = get_school(db, id).await?;

    let uniforms = uniform::Entity::find()
        .filter(uniform::Column::SchoolId.eq(id))
        .all(db)
        .await?;
    let uniform_ids: Vec<Uuid> = uniforms.iter().map(|u| u.id).collect();

    let mut to_release: Vec<String> = uniforms.iter().filter_map(|u| u.image_url.clone()).collect();
    if let Some(banner) = school.banner_image.clone() {
        to_release.push(banner);
    }

    let txn = db.begin().await?;

    let pricings_deleted = if uniform_ids.is_empty() {
        0
    } else {
        pricing::Entity::delete_many()
            .filter(pricing::Column::UniformId.is_in(uniform_ids.clone()))
            .exec(&txn)
            .await?
            .rows_affected
    };

    let uniforms_deleted = uniform::Entity::delete_many()
        .filter(uniform::Column::SchoolId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    school::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    for reference in &to_release {
        assets::release(assets, reference).await;
    }

    info!(
        school = %id,
        uniforms_deleted,
        pricings_deleted,
        "Deleted school with its uniforms and pricings"
    );
    Ok(SchoolDeletion {
        uniforms_deleted,
        pricings_deleted,
    })
}

// ============================================================
// Uniforms
// ============================================================

pub async fn create_uniform(
    db: &DatabaseConnection,
    input: UniformInput,
) -> CoreResult<(uniform::Model, bool)> {
    let category = validate_category(&input.category)?.to_string();
    let (school, school_created) = find_or_create_school(db, &input.school_name).await?;

    let now = Utc::now();
    let created = uniform::ActiveModel {
        id: Set(Uuid::new_v4()),
        school_id: Set(school.id),
        category: Set(category),
        season: Set(input.season),
        kind: Set(input.kind),
        class_start: Set(input.class_start),
        class_end: Set(input.class_end),
        extra_info: Set(input.extra_info),
        image_url: Set(input.image_url),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!(uniform = %created.id, school = %school.id, "Created uniform");
    Ok((created, school_created))
}

/// Every uniform across all schools. Powers the admin overview.
pub async fn list_uniforms(db: &DatabaseConnection) -> CoreResult<Vec<uniform::Model>> {
    Ok(uniform::Entity::find()
        .order_by_asc(uniform::Column::Category)
        .all(db)
        .await?)
}

pub async fn get_uniform(db: &DatabaseConnection, id: Uuid) -> CoreResult<uniform::Model> {
    uniform::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| CoreError::not_found(UNIFORM, id))
}

/// Uniforms of a school, optionally narrowed to a season. A season filter
/// also matches `All` items since those are worn year-round.
pub async fn list_uniforms_for_school(
    db: &DatabaseConnection,
    school_id: Uuid,
    season: Option<Season>,
) -> CoreResult<Vec<uniform::Model>> {
    get_school(db, school_id).await?;

    let mut query = uniform::Entity::find().filter(uniform::Column::SchoolId.eq(school_id));

    if let Some(season) = season {
        if season != Season::All {
            query = query.filter(uniform::Column::Season.is_in([season, Season::All]));
        }
    }

    Ok(query.all(db).await?)
}

pub async fn update_uniform(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    id: Uuid,
    input: UniformInput,
) -> CoreResult<(uniform::Model, bool)> {
    let category = validate_category(&input.category)?.to_string();

    let existing = get_uniform(db, id).await?;
    let (school, school_created) = find_or_create_school(db, &input.school_name).await?;

    let old_image = existing.image_url.clone();
    let replacing_image = input.image_url.is_some();

    let mut active: uniform::ActiveModel = existing.into();
    active.school_id = Set(school.id);
    active.category = Set(category);
    active.season = Set(input.season);
    active.kind = Set(input.kind);
    active.class_start = Set(input.class_start);
    active.class_end = Set(input.class_end);
    active.extra_info = Set(input.extra_info);
    if let Some(image) = input.image_url {
        active.image_url = Set(Some(image));
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(db).await?;

    if replacing_image {
        if let Some(old) = old_image {
            assets::release(assets, &old).await;
        }
    }

    Ok((updated, school_created))
}

/// Delete a uniform together with every pricing referencing it, then
/// release its image asset. Returns the deleted pricing count.
pub async fn delete_uniform(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    id: Uuid,
) -> CoreResult<u64> {
    let existing = get_uniform(db, id).await?;
    let image = existing.image_url.clone();

    let txn = db.begin().await?;

    let pricings_deleted = pricing::Entity::delete_many()
        .filter(pricing::Column::UniformId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;

    uniform::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    if let Some(reference) = image {
        assets::release(assets, &reference).await;
    }

    info!(uniform = %id, pricings_deleted, "Deleted uniform and its pricings");
    Ok(pricings_deleted)
}
