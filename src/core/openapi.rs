use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::pets::{dtos as pets_dtos, handlers as pets_handlers};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        pets_handlers::list_pets,
        pets_handlers::create_pet,
        pets_handlers::delete_pets,
        pets_handlers::delete_pet,
        pets_handlers::upload_photo,
        pets_handlers::list_pet_types,
    ),
    components(
        schemas(
            ErrorResponse,
            pets_dtos::CreatePetDto,
            pets_dtos::DeletePetsDto,
            pets_dtos::UploadPhotoDto,
            pets_dtos::PetTypeResponseDto,
            pets_dtos::PetPhotoDto,
            pets_dtos::PetResponseDto,
            pets_dtos::PetListResponseDto,
            pets_dtos::DeleteErrorDto,
            pets_dtos::DeletePetsResponseDto,
            pets_dtos::PhotoResponseDto,
        )
    ),
    tags(
        (name = "pets", description = "Pet records and their photos"),
        (name = "pet-types", description = "Available pet types"),
    ),
    info(
        title = "Pets API",
        version = "0.1.0",
        description = "Pet records and photos",
    )
)]
pub struct ApiDoc;

/// Adds the API key header security scheme, named after the configured header
pub struct ApiKeySecurityAddon {
    pub header: String,
}

impl Modify for ApiKeySecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(&self.header))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
