//! Pets feature.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/pets` | List pets, optionally filtered by photo presence |
//! | POST | `/pets` | Create a pet |
//! | DELETE | `/pets` | Delete several pets, reporting per-id errors |
//! | DELETE | `/pets/{id}` | Delete one pet |
//! | POST | `/pets/{id}/photo` | Attach a photo to a pet |
//! | GET | `/pet-types` | List pet types |
//!
//! Every endpoint requires the API key header.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::PetService;
