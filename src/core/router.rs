use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::error::AppError;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, ApiKeySecurityAddon, SwaggerInfoModifier};
use crate::features::pets::{self, PetService};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> AppError {
    AppError::NotFound("Resource not found".to_string())
}

/// Assemble the full application: docs, API-key protected pet routes,
/// health check and the media file server.
pub fn build_router(config: &Config, pet_service: Arc<PetService>, media_root: &Path) -> Router {
    let mut openapi = ApiDoc::openapi();
    SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    }
    .modify(&mut openapi);
    ApiKeySecurityAddon {
        header: config.api_key.header.clone(),
    }
    .modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Every pets endpoint requires the API key
    let protected_routes = Router::new()
        .merge(pets::routes(pet_service))
        .route_layer(from_fn_with_state(
            Arc::new(config.api_key.clone()),
            middleware::api_key_middleware,
        ));

    let health_route = Router::new().route("/health", get(health_check));

    // Stored photos are public once their URL is known
    let media = ServeDir::new(media_root);

    Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(health_route)
        .nest_service(&config.media.url_prefix, media)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
