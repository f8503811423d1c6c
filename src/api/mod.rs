//! API handlers for Ropey REST endpoints

pub mod catalog;
pub mod health;
pub mod members;

use axum::{
    async_trait,
    extract::{DefaultBodyLimit, FromRequestParts},
    http::{request::Parts, HeaderValue},
    routing::get,
    Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::CorsConfig, error::AppError, models::AccessClaims, AppState};

/// Extractor for authenticated staff from a bearer JWT
pub struct AuthenticatedUser(pub AccessClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Authentication("Missing or malformed bearer token".to_string()))?;

        let claims = AccessClaims::from_token(
            bearer.token(),
            &state.config.auth.jwt_secret,
            &state.config.auth.jwt_issuer,
        )
        .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);
    let max_body_bytes = state.config.server.max_body_bytes;

    let api = Router::new()
        .route("/health", get(health::health_check))
        // Members; writes carry base64 profile photos
        .route(
            "/members",
            get(members::list_members)
                .post(members::register_member)
                .put(members::update_member)
                .delete(members::delete_member)
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .route("/members/forLoan", get(members::list_for_loan))
        .route("/members/memberWithLoans", get(members::list_with_loans))
        .route("/members/nonActive", get(members::list_inactive))
        .route("/members/search/:last_name", get(members::search_members))
        .route("/members/:id", get(members::get_member))
        // Catalog
        .route("/categories", get(catalog::list_categories))
        .route("/producers", get(catalog::list_producers))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
