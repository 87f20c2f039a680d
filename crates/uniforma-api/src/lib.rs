pub mod handlers;
pub mod middleware;
pub mod models;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use sea_orm::DatabaseConnection;
use uniforma_core::AssetStore;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    pub assets: Arc<dyn AssetStore>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Uniforma API",
        version = "0.1.0",
        description = "REST API for the school uniform catalog and pricing admin",
        contact(
            name = "Uniforma Team",
            email = "team@uniforma.example"
        )
    ),
    paths(
        handlers::health_check,
        handlers::list_schools,
        handlers::count_schools,
        handlers::get_school,
        handlers::create_school,
        handlers::update_school,
        handlers::delete_school,
        handlers::list_school_uniforms,
        handlers::list_uniforms,
        handlers::get_uniform,
        handlers::create_uniform,
        handlers::update_uniform,
        handlers::delete_uniform,
        handlers::resolve_variant,
        handlers::list_uniform_pricings,
        handlers::list_pricings,
        handlers::get_pricing,
        handlers::create_pricing,
        handlers::update_pricing,
        handlers::delete_pricing,
        handlers::list_base_pricings,
        handlers::list_base_pricings_by_category,
        handlers::get_base_pricing,
        handlers::create_base_pricing,
        handlers::update_base_pricing,
        handlers::detach_delete_base_pricing,
        handlers::cascade_delete_base_pricing,
    ),
    components(
        schemas(
            models::Season,
            models::UniformKind,
            models::PriceEntry,
            models::School,
            models::SchoolList,
            models::SchoolRequest,
            models::DeleteSchoolResponse,
            models::SchoolCount,
            models::Uniform,
            models::UniformList,
            models::UniformRequest,
            models::UniformResponse,
            models::DeleteUniformResponse,
            models::UniformQuery,
            models::BasePricing,
            models::BasePricingList,
            models::BasePricingRequest,
            models::UpdateBasePricingResponse,
            models::DetachDeleteResponse,
            models::CascadeDeleteResponse,
            models::Pricing,
            models::PricingList,
            models::PricingRequest,
            models::DeletePricingResponse,
            models::VariantQuery,
            models::VariantResponse,
            models::HealthResponse,
            models::ErrorResponse,
        )
    ),
    tags(
        (name = "schools", description = "School management endpoints"),
        (name = "uniforms", description = "Uniform catalog endpoints"),
        (name = "pricings", description = "Pricing instance and variant resolution endpoints"),
        (name = "base-pricings", description = "Base pricing template endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS (for development)
    pub enable_cors: bool,
    /// Secret for validating staff JWTs
    pub jwt_secret: String,
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        config: ApiServerConfig,
        db: DatabaseConnection,
        assets: Arc<dyn AssetStore>,
    ) -> Self {
        let state = Arc::new(AppState { db, assets });
        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let jwt_state = Arc::new(middleware::JwtState::new(
            self.config.jwt_secret.as_bytes(),
        ));

        // PUBLIC routes: the storefront read surface
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/schools", get(handlers::list_schools))
            .route("/api/schools/count", get(handlers::count_schools))
            .route("/api/schools/{id}", get(handlers::get_school))
            .route(
                "/api/schools/{id}/uniforms",
                get(handlers::list_school_uniforms),
            )
            .route("/api/uniforms", get(handlers::list_uniforms))
            .route("/api/uniforms/{id}", get(handlers::get_uniform))
            .route(
                "/api/uniforms/{id}/pricings",
                get(handlers::list_uniform_pricings),
            )
            .route("/api/uniforms/{id}/price", get(handlers::resolve_variant))
            .route("/api/pricings", get(handlers::list_pricings))
            .route("/api/pricings/{id}", get(handlers::get_pricing))
            .route("/api/base-pricings", get(handlers::list_base_pricings))
            .route(
                "/api/base-pricings/category/{category}",
                get(handlers::list_base_pricings_by_category),
            )
            .route("/api/base-pricings/{id}", get(handlers::get_base_pricing))
            .with_state(self.state.clone());

        // PROTECTED routes: every mutation requires a staff session token
        let protected_router = Router::new()
            .route("/api/schools", post(handlers::create_school))
            .route(
                "/api/schools/{id}",
                axum::routing::put(handlers::update_school).delete(handlers::delete_school),
            )
            .route("/api/uniforms", post(handlers::create_uniform))
            .route(
                "/api/uniforms/{id}",
                axum::routing::put(handlers::update_uniform).delete(handlers::delete_uniform),
            )
            .route("/api/pricings", post(handlers::create_pricing))
            .route(
                "/api/pricings/{id}",
                axum::routing::put(handlers::update_pricing).delete(handlers::delete_pricing),
            )
            .route("/api/base-pricings", post(handlers::create_base_pricing))
            .route(
                "/api/base-pricings/{id}",
                axum::routing::put(handlers::update_base_pricing),
            )
            .route(
                "/api/base-pricings/{id}/detach",
                delete(handlers::detach_delete_base_pricing),
            )
            .route(
                "/api/base-pricings/{id}/cascade",
                delete(handlers::cascade_delete_base_pricing),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state.clone(),
                middleware::require_auth,
            ));

        let api_router = public_router.merge(protected_router);

        // SwaggerUi automatically creates a route for /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        let cors = if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            // Cookie-based auth needs credentials, which rules out a
            // wildcard origin. Allow local development origins only.
            let cors_layer = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            Some(cors_layer)
        } else {
            None
        };

        let mut router = router.layer(TraceLayer::new_for_http());

        if let Some(cors) = cors {
            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        // Ensure OpenAPI spec can be generated without panics
        let _api_doc = ApiDoc::openapi();
    }
}
