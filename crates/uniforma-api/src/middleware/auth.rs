//! JWT Authentication Middleware
//!
//! Protects the admin mutation routes. Extracts a JWT from the session
//! cookie or Authorization header, validates it, and makes the staff
//! context available to handlers via Axum's Extension.
//!
//! Token issuance is out of scope for this service; any HS256 token signed
//! with the configured secret and carrying a subject is accepted.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::ErrorResponse;

/// JWT claims carried by staff tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffClaims {
    /// Staff member identifier
    pub sub: String,
    /// Expiration (unix seconds)
    pub exp: i64,
    /// Role, defaults to "staff" when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Authenticated staff context extracted from the JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStaff {
    pub staff_id: String,
    pub role: String,
}

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    decoding_key: Arc<DecodingKey>,
}

impl JwtState {
    /// Create new JWT state with the given secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    fn validate(&self, token: &str) -> Result<StaffClaims, jsonwebtoken::errors::Error> {
        let data = decode::<StaffClaims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}

/// Sign a staff token. Used by tests and operational tooling; the service
/// itself never issues tokens.
pub fn sign_token(
    secret: &[u8],
    claims: &StaffClaims,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
}

fn unauthorized(message: impl Into<String>, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.into(),
            code: Some(code.to_string()),
        }),
    )
}

/// Authentication middleware for the admin routes.
///
/// Extracts the JWT from an HTTP-only `session_token` cookie or an
/// `Authorization: Bearer <token>` header, validates signature and
/// expiration, and injects [`AuthStaff`] into request extensions.
pub async fn require_auth(
    state: axum::extract::State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // Cookie first (preferred for the admin web UI)
    let token = if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        cookie_header.to_str().ok().and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find(|c| c.starts_with("session_token="))
                .and_then(|c| c.strip_prefix("session_token="))
        })
    } else {
        None
    };

    // Fall back to the Authorization header (API clients)
    let token = match token {
        Some(t) => t.to_string(),
        None => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| {
                    unauthorized(
                        "Missing authentication token (cookie or Authorization header)",
                        "MISSING_AUTH",
                    )
                })?;

            auth_header
                .strip_prefix("Bearer ")
                .ok_or_else(|| {
                    unauthorized(
                        "Invalid Authorization header format. Expected 'Bearer <token>'",
                        "INVALID_AUTH_FORMAT",
                    )
                })?
                .to_string()
        }
    };

    let claims = state.validate(&token).map_err(|e| {
        unauthorized(format!("Invalid or expired token: {}", e), "INVALID_TOKEN")
    })?;

    let staff = AuthStaff {
        staff_id: claims.sub,
        role: claims.role.unwrap_or_else(|| "staff".to_string()),
    };

    request.extensions_mut().insert(staff);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use tower::ServiceExt; // For oneshot()

    async fn protected_handler(
        axum::Extension(staff): axum::Extension<AuthStaff>,
    ) -> Json<AuthStaff> {
        Json(staff)
    }

    fn create_test_app(jwt_secret: &[u8]) -> Router {
        let jwt_state = Arc::new(JwtState::new(jwt_secret));

        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(
                jwt_state.clone(),
                require_auth,
            ))
            .with_state(jwt_state)
    }

    fn claims_expiring_in(seconds: i64) -> StaffClaims {
        StaffClaims {
            sub: "staff-1".to_string(),
            exp: chrono::Utc::now().timestamp() + seconds,
            role: Some("admin".to_string()),
        }
    }

    #[tokio::test]
    async fn test_auth_middleware_valid_token() {
        let jwt_secret = b"test-secret-key";
        let app = create_test_app(jwt_secret);

        let token = sign_token(jwt_secret, &claims_expiring_in(3600)).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let staff: AuthStaff = serde_json::from_slice(&body).unwrap();

        assert_eq!(staff.staff_id, "staff-1");
        assert_eq!(staff.role, "admin");
    }

    #[tokio::test]
    async fn test_auth_middleware_token_from_cookie() {
        let jwt_secret = b"test-secret-key";
        let app = create_test_app(jwt_secret);

        let token = sign_token(jwt_secret, &claims_expiring_in(3600)).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Cookie", format!("session_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_auth_middleware_missing_token() {
        let app = create_test_app(b"test-secret-key");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();

        assert!(error.error.contains("Missing authentication token"));
    }

    #[tokio::test]
    async fn test_auth_middleware_invalid_bearer_format() {
        let app = create_test_app(b"test-secret-key");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", "InvalidFormat token123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_middleware_expired_token() {
        let jwt_secret = b"test-secret-key";
        let app = create_test_app(jwt_secret);

        let token = sign_token(jwt_secret, &claims_expiring_in(-600)).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_middleware_wrong_secret() {
        let app = create_test_app(b"test-secret-key");

        let token = sign_token(b"wrong-secret-key", &claims_expiring_in(3600)).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/protected")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
