use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use uniforma_core::catalog::{self, SchoolInput, UniformInput};
use uniforma_core::linkage::{self, PricingInput, TemplateInput};
use uniforma_core::CoreError;

use crate::models::*;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a core error onto an HTTP status and JSON body.
fn map_err(err: CoreError) -> ApiError {
    let (status, code) = match &err {
        CoreError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        CoreError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        CoreError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: Some(code.to_string()),
        }),
    )
}

// ============================================================
// System
// ============================================================

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================
// Schools
// ============================================================

/// List all schools
#[utoipa::path(
    get,
    path = "/api/schools",
    responses(
        (status = 200, description = "List of schools", body = SchoolList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "schools"
)]
pub async fn list_schools(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchoolList>, ApiError> {
    let schools: Vec<School> = catalog::list_schools(&state.db)
        .await
        .map_err(map_err)?
        .into_iter()
        .map(Into::into)
        .collect();

    let total = schools.len();
    Ok(Json(SchoolList { schools, total }))
}

/// Count schools
#[utoipa::path(
    get,
    path = "/api/schools/count",
    responses(
        (status = 200, description = "Number of schools", body = SchoolCount),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "schools"
)]
pub async fn count_schools(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SchoolCount>, ApiError> {
    let count = catalog::count_schools(&state.db).await.map_err(map_err)?;
    Ok(Json(SchoolCount { count }))
}

/// Get a school by ID
#[utoipa::path(
    get,
    path = "/api/schools/{id}",
    params(
        ("id" = Uuid, Path, description = "School ID")
    ),
    responses(
        (status = 200, description = "School information", body = School),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "schools"
)]
pub async fn get_school(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<School>, ApiError> {
    let school = catalog::get_school(&state.db, id).await.map_err(map_err)?;
    Ok(Json(school.into()))
}

/// Create a school
#[utoipa::path(
    post,
    path = "/api/schools",
    request_body = SchoolRequest,
    responses(
        (status = 201, description = "School created", body = School),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "School name already taken", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "schools"
)]
pub async fn create_school(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SchoolRequest>,
) -> Result<(StatusCode, Json<School>), ApiError> {
    let school = catalog::create_school(
        &state.db,
        SchoolInput {
            name: request.name,
            location: request.location,
            banner_image: request.banner_image,
        },
    )
    .await
    .map_err(map_err)?;

    Ok((StatusCode::CREATED, Json(school.into())))
}

/// Update a school
#[utoipa::path(
    put,
    path = "/api/schools/{id}",
    params(
        ("id" = Uuid, Path, description = "School ID")
    ),
    request_body = SchoolRequest,
    responses(
        (status = 200, description = "School updated", body = School),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 409, description = "School name already taken", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "schools"
)]
pub async fn update_school(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SchoolRequest>,
) -> Result<Json<School>, ApiError> {
    let school = catalog::update_school(
        &state.db,
        state.assets.as_ref(),
        id,
        SchoolInput {
            name: request.name,
            location: request.location,
            banner_image: request.banner_image,
        },
    )
    .await
    .map_err(map_err)?;

    Ok(Json(school.into()))
}

/// Delete a school together with its uniforms and their pricings
#[utoipa::path(
    delete,
    path = "/api/schools/{id}",
    params(
        ("id" = Uuid, Path, description = "School ID")
    ),
    responses(
        (status = 200, description = "School deleted", body = DeleteSchoolResponse),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "schools"
)]
pub async fn delete_school(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteSchoolResponse>, ApiError> {
    let deletion = catalog::delete_school(&state.db, state.assets.as_ref(), id)
        .await
        .map_err(map_err)?;

    Ok(Json(DeleteSchoolResponse {
        id,
        uniforms_deleted: deletion.uniforms_deleted,
        pricings_deleted: deletion.pricings_deleted,
    }))
}

// ============================================================
// Uniforms
// ============================================================

/// List a school's uniforms, optionally filtered by season
#[utoipa::path(
    get,
    path = "/api/schools/{id}/uniforms",
    params(
        ("id" = Uuid, Path, description = "School ID"),
        ("season" = Option<Season>, Query, description = "Season filter; 'All' items always match")
    ),
    responses(
        (status = 200, description = "Uniforms of the school", body = UniformList),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "uniforms"
)]
pub async fn list_school_uniforms(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<UniformQuery>,
) -> Result<Json<UniformList>, ApiError> {
    let uniforms =
        catalog::list_uniforms_for_school(&state.db, id, query.season.map(Into::into))
            .await
            .map_err(map_err)?;

    Ok(Json(uniforms.into()))
}

/// List all uniforms across schools
#[utoipa::path(
    get,
    path = "/api/uniforms",
    responses(
        (status = 200, description = "List of uniforms", body = UniformList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "uniforms"
)]
pub async fn list_uniforms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UniformList>, ApiError> {
    let uniforms = catalog::list_uniforms(&state.db).await.map_err(map_err)?;
    Ok(Json(uniforms.into()))
}

/// Get a uniform by ID
#[utoipa::path(
    get,
    path = "/api/uniforms/{id}",
    params(
        ("id" = Uuid, Path, description = "Uniform ID")
    ),
    responses(
        (status = 200, description = "Uniform information", body = Uniform),
        (status = 404, description = "Uniform not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "uniforms"
)]
pub async fn get_uniform(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Uniform>, ApiError> {
    let uniform = catalog::get_uniform(&state.db, id).await.map_err(map_err)?;
    Ok(Json(uniform.into()))
}

fn uniform_input(request: UniformRequest) -> UniformInput {
    UniformInput {
        school_name: request.school_name,
        category: request.category,
        season: request.season.into(),
        kind: request.kind.into(),
        class_start: request.class_start,
        class_end: request.class_end,
        extra_info: request.extra_info,
        image_url: request.image_url,
    }
}

/// Create a uniform; an unknown school name auto-creates the school
#[utoipa::path(
    post,
    path = "/api/uniforms",
    request_body = UniformRequest,
    responses(
        (status = 201, description = "Uniform created", body = UniformResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "uniforms"
)]
pub async fn create_uniform(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UniformRequest>,
) -> Result<(StatusCode, Json<UniformResponse>), ApiError> {
    let (uniform, school_created) = catalog::create_uniform(&state.db, uniform_input(request))
        .await
        .map_err(map_err)?;

    Ok((
        StatusCode::CREATED,
        Json(UniformResponse {
            uniform: uniform.into(),
            school_created,
        }),
    ))
}

/// Update a uniform
#[utoipa::path(
    put,
    path = "/api/uniforms/{id}",
    params(
        ("id" = Uuid, Path, description = "Uniform ID")
    ),
    request_body = UniformRequest,
    responses(
        (status = 200, description = "Uniform updated", body = UniformResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Uniform not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "uniforms"
)]
pub async fn update_uniform(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UniformRequest>,
) -> Result<Json<UniformResponse>, ApiError> {
    let (uniform, school_created) =
        catalog::update_uniform(&state.db, state.assets.as_ref(), id, uniform_input(request))
            .await
            .map_err(map_err)?;

    Ok(Json(UniformResponse {
        uniform: uniform.into(),
        school_created,
    }))
}

/// Delete a uniform together with its pricings
#[utoipa::path(
    delete,
    path = "/api/uniforms/{id}",
    params(
        ("id" = Uuid, Path, description = "Uniform ID")
    ),
    responses(
        (status = 200, description = "Uniform deleted", body = DeleteUniformResponse),
        (status = 404, description = "Uniform not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "uniforms"
)]
pub async fn delete_uniform(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteUniformResponse>, ApiError> {
    let pricings_deleted = catalog::delete_uniform(&state.db, state.assets.as_ref(), id)
        .await
        .map_err(map_err)?;

    Ok(Json(DeleteUniformResponse {
        id,
        pricings_deleted,
    }))
}

// ============================================================
// Variant resolution
// ============================================================

/// Resolve the best-matching price list for a uniform and a tag selection
///
/// Among pricings whose tags cover the selection, the one with the fewest
/// tags wins. A null `pricing` means nothing qualifies.
#[utoipa::path(
    get,
    path = "/api/uniforms/{id}/price",
    params(
        ("id" = Uuid, Path, description = "Uniform ID"),
        ("tags" = Option<String>, Query, description = "Comma-separated tag selection")
    ),
    responses(
        (status = 200, description = "Best-matching pricing, or null", body = VariantResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "pricings"
)]
pub async fn resolve_variant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<VariantQuery>,
) -> Result<Json<VariantResponse>, ApiError> {
    let selected: Vec<String> = query
        .tags
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    debug!(uniform = %id, ?selected, "Resolving pricing variant");

    let pricing = linkage::resolve_variant(&state.db, id, &selected)
        .await
        .map_err(map_err)?;

    Ok(Json(VariantResponse {
        pricing: pricing.map(Into::into),
    }))
}

// ============================================================
// Pricings
// ============================================================

/// List all pricings across uniforms
#[utoipa::path(
    get,
    path = "/api/pricings",
    responses(
        (status = 200, description = "List of pricings", body = PricingList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "pricings"
)]
pub async fn list_pricings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PricingList>, ApiError> {
    let pricings = linkage::list_pricings(&state.db).await.map_err(map_err)?;
    Ok(Json(pricings.into()))
}

/// List the pricings of a uniform
#[utoipa::path(
    get,
    path = "/api/uniforms/{id}/pricings",
    params(
        ("id" = Uuid, Path, description = "Uniform ID")
    ),
    responses(
        (status = 200, description = "Pricings of the uniform", body = PricingList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "pricings"
)]
pub async fn list_uniform_pricings(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PricingList>, ApiError> {
    let pricings = linkage::list_pricings_for_uniform(&state.db, id)
        .await
        .map_err(map_err)?;

    Ok(Json(pricings.into()))
}

/// Get a pricing by ID
#[utoipa::path(
    get,
    path = "/api/pricings/{id}",
    params(
        ("id" = Uuid, Path, description = "Pricing ID")
    ),
    responses(
        (status = 200, description = "Pricing information", body = Pricing),
        (status = 404, description = "Pricing not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "pricings"
)]
pub async fn get_pricing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Pricing>, ApiError> {
    let pricing = linkage::get_pricing(&state.db, id).await.map_err(map_err)?;
    Ok(Json(pricing.into()))
}

fn pricing_input(request: PricingRequest) -> PricingInput {
    PricingInput {
        uniform_id: request.uniform_id,
        tags: request.tags,
        price_data: price_rows(request.price_data),
        base_pricing_id: request.base_pricing_id,
    }
}

/// Create a pricing, optionally linked to a base pricing template
#[utoipa::path(
    post,
    path = "/api/pricings",
    request_body = PricingRequest,
    responses(
        (status = 201, description = "Pricing created", body = Pricing),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Uniform or template not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "pricings"
)]
pub async fn create_pricing(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PricingRequest>,
) -> Result<(StatusCode, Json<Pricing>), ApiError> {
    let pricing = linkage::create_pricing(&state.db, pricing_input(request))
        .await
        .map_err(map_err)?;

    Ok((StatusCode::CREATED, Json(pricing.into())))
}

/// Update a pricing; omitting `base_pricing_id` detaches it from its template
#[utoipa::path(
    put,
    path = "/api/pricings/{id}",
    params(
        ("id" = Uuid, Path, description = "Pricing ID")
    ),
    request_body = PricingRequest,
    responses(
        (status = 200, description = "Pricing updated", body = Pricing),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Pricing not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "pricings"
)]
pub async fn update_pricing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<PricingRequest>,
) -> Result<Json<Pricing>, ApiError> {
    let pricing = linkage::update_pricing(&state.db, id, pricing_input(request))
        .await
        .map_err(map_err)?;

    Ok(Json(pricing.into()))
}

/// Delete a pricing
#[utoipa::path(
    delete,
    path = "/api/pricings/{id}",
    params(
        ("id" = Uuid, Path, description = "Pricing ID")
    ),
    responses(
        (status = 200, description = "Pricing deleted", body = DeletePricingResponse),
        (status = 404, description = "Pricing not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "pricings"
)]
pub async fn delete_pricing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletePricingResponse>, ApiError> {
    let id = linkage::delete_pricing(&state.db, id).await.map_err(map_err)?;
    Ok(Json(DeletePricingResponse { id }))
}

// ============================================================
// Base pricing templates
// ============================================================

/// List all base pricing templates
#[utoipa::path(
    get,
    path = "/api/base-pricings",
    responses(
        (status = 200, description = "List of templates", body = BasePricingList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "base-pricings"
)]
pub async fn list_base_pricings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BasePricingList>, ApiError> {
    let templates = linkage::list_templates(&state.db).await.map_err(map_err)?;
    Ok(Json(templates.into()))
}

/// List templates matching a category exactly
#[utoipa::path(
    get,
    path = "/api/base-pricings/category/{category}",
    params(
        ("category" = String, Path, description = "Category to match")
    ),
    responses(
        (status = 200, description = "Templates of the category", body = BasePricingList),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "base-pricings"
)]
pub async fn list_base_pricings_by_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<BasePricingList>, ApiError> {
    let templates = linkage::list_templates_by_category(&state.db, &category)
        .await
        .map_err(map_err)?;

    Ok(Json(templates.into()))
}

/// Get a base pricing template by ID
#[utoipa::path(
    get,
    path = "/api/base-pricings/{id}",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template information", body = BasePricing),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "base-pricings"
)]
pub async fn get_base_pricing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BasePricing>, ApiError> {
    let template = linkage::get_template(&state.db, id).await.map_err(map_err)?;
    Ok(Json(template.into()))
}

fn template_input(request: BasePricingRequest) -> TemplateInput {
    TemplateInput {
        category: request.category,
        tags: request.tags,
        price_data: price_rows(request.price_data),
    }
}

/// Create a base pricing template
#[utoipa::path(
    post,
    path = "/api/base-pricings",
    request_body = BasePricingRequest,
    responses(
        (status = 201, description = "Template created", body = BasePricing),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "base-pricings"
)]
pub async fn create_base_pricing(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BasePricingRequest>,
) -> Result<(StatusCode, Json<BasePricing>), ApiError> {
    let template = linkage::create_template(&state.db, template_input(request))
        .await
        .map_err(map_err)?;

    Ok((StatusCode::CREATED, Json(template.into())))
}

/// Update a template and propagate to every linked pricing
#[utoipa::path(
    put,
    path = "/api/base-pricings/{id}",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    request_body = BasePricingRequest,
    responses(
        (status = 200, description = "Template updated and propagated", body = UpdateBasePricingResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "base-pricings"
)]
pub async fn update_base_pricing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<BasePricingRequest>,
) -> Result<Json<UpdateBasePricingResponse>, ApiError> {
    let (template, propagated_count) =
        linkage::update_template(&state.db, id, template_input(request))
            .await
            .map_err(map_err)?;

    Ok(Json(UpdateBasePricingResponse {
        base_pricing: template.into(),
        propagated_count,
    }))
}

/// Delete a template, detaching its linked pricings first
#[utoipa::path(
    delete,
    path = "/api/base-pricings/{id}/detach",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template deleted, pricings kept", body = DetachDeleteResponse),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "base-pricings"
)]
pub async fn detach_delete_base_pricing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DetachDeleteResponse>, ApiError> {
    let detached_count = linkage::detach_delete_template(&state.db, id)
        .await
        .map_err(map_err)?;

    Ok(Json(DetachDeleteResponse { id, detached_count }))
}

/// Delete a template together with every linked pricing
#[utoipa::path(
    delete,
    path = "/api/base-pricings/{id}/cascade",
    params(
        ("id" = Uuid, Path, description = "Template ID")
    ),
    responses(
        (status = 200, description = "Template and linked pricings deleted", body = CascadeDeleteResponse),
        (status = 404, description = "Template not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "base-pricings"
)]
pub async fn cascade_delete_base_pricing(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CascadeDeleteResponse>, ApiError> {
    let deleted_children_count = linkage::cascade_delete_template(&state.db, id)
        .await
        .map_err(map_err)?;

    Ok(Json(CascadeDeleteResponse {
        id,
        deleted_children_count,
    }))
}
