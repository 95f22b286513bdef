use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::pets::dtos::MAX_PHOTO_SIZE;
use crate::features::pets::handlers;
use crate::features::pets::services::PetService;

/// Create routes for the pets feature
///
/// Authentication is applied by the caller.
pub fn routes(service: Arc<PetService>) -> Router {
    Router::new()
        .route(
            "/pets",
            get(handlers::list_pets)
                .post(handlers::create_pet)
                .delete(handlers::delete_pets),
        )
        .route("/pets/{id}", delete(handlers::delete_pet))
        .route(
            "/pets/{id}/photo",
            // Allow body size up to MAX_PHOTO_SIZE + buffer for multipart overhead
            post(handlers::upload_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_SIZE + 1024 * 1024)),
        )
        .route("/pet-types", get(handlers::list_pet_types))
        .with_state(service)
}
