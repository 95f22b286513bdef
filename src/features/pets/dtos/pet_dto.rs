use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{field_errors, AppError, Result};
use crate::features::pets::models::{NewPet, PetPhoto, PetType, PetWithPhotos};
use crate::modules::storage::LocalStorage;
use crate::shared::constants::{CREATED_AT_FORMAT, MSG_FIELD_REQUIRED};

// =============================================================================
// REQUESTS
// =============================================================================

/// Query params for listing pets.
///
/// Kept as raw strings so malformed values are reported with the service's
/// own messages.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPetsQuery {
    /// `true` for pets with at least one photo, `false` for pets without
    pub has_photos: Option<String>,
    /// Page size (default: 20)
    pub limit: Option<String>,
    /// Number of pets to skip (default: 0)
    pub offset: Option<String>,
}

/// Request DTO for creating a pet
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePetDto {
    #[validate(length(min = 1, max = 50, message = "Ensure this field has 1 to 50 characters."))]
    #[schema(example = "Barsik")]
    pub name: Option<String>,

    #[schema(example = 3)]
    pub age: Option<i32>,

    /// Id of the pet type
    #[serde(rename = "type")]
    #[schema(example = 2)]
    pub pet_type: Option<i32>,
}

impl CreatePetDto {
    /// Check required fields and field constraints, reporting every problem at once
    pub fn into_new_pet(self) -> Result<NewPet> {
        let mut errors = self
            .validate()
            .err()
            .map(|e| field_errors(&e))
            .unwrap_or_default();

        let required = [
            ("name", self.name.is_none()),
            ("age", self.age.is_none()),
            ("type", self.pet_type.is_none()),
        ];
        for (field, missing) in required {
            if missing {
                errors
                    .entry(field.to_string())
                    .or_default()
                    .push(MSG_FIELD_REQUIRED.to_string());
            }
        }

        match (self.name, self.age, self.pet_type) {
            (Some(name), Some(age), Some(type_id)) if errors.is_empty() => Ok(NewPet {
                name,
                age,
                type_id,
            }),
            _ => Err(AppError::InvalidFields(errors)),
        }
    }
}

/// Request DTO for deleting several pets at once
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeletePetsDto {
    /// Pet ids to delete. Must be a non-empty list.
    #[schema(value_type = Vec<String>)]
    pub ids: Option<serde_json::Value>,
}

/// Upload photo request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadPhotoDto {
    /// The image to attach
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Response DTO for pet type
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PetTypeResponseDto {
    pub id: i32,
    pub name: String,
}

impl From<PetType> for PetTypeResponseDto {
    fn from(t: PetType) -> Self {
        Self {
            id: t.id,
            name: t.name,
        }
    }
}

/// A photo as embedded in a pet
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PetPhotoDto {
    pub id: Uuid,
    /// Absolute URL of the image
    pub image: String,
}

impl PetPhotoDto {
    fn from_model(photo: PetPhoto, storage: &LocalStorage) -> Self {
        Self {
            id: photo.id,
            image: storage.get_file_url(&photo.image),
        }
    }
}

/// Response DTO for pet
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PetResponseDto {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    /// Name of the pet type
    #[serde(rename = "type")]
    #[schema(example = "dog")]
    pub pet_type: String,
    pub photos: Vec<PetPhotoDto>,
    /// Creation time, `YYYY-MM-DDTHH:MM:SS`
    #[schema(example = "2025-01-01T12:00:00")]
    pub created_at: String,
}

impl PetResponseDto {
    pub fn from_model(model: PetWithPhotos, storage: &LocalStorage) -> Self {
        let PetWithPhotos { pet, photos } = model;
        Self {
            id: pet.id,
            name: pet.name,
            age: pet.age,
            pet_type: pet.type_name,
            photos: photos
                .into_iter()
                .map(|photo| PetPhotoDto::from_model(photo, storage))
                .collect(),
            created_at: pet.created_at.format(CREATED_AT_FORMAT).to_string(),
        }
    }
}

/// Paginated pet list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PetListResponseDto {
    /// Number of pets matching the filter, before pagination
    pub count: i64,
    pub data: Vec<PetResponseDto>,
}

/// One id that could not be deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeleteErrorDto {
    /// The id exactly as supplied by the client
    #[schema(value_type = String)]
    pub id: serde_json::Value,
    pub error: String,
}

/// Result of a bulk delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletePetsResponseDto {
    /// Number of ids that were deleted
    pub deleted: usize,
    pub errors: Vec<DeleteErrorDto>,
}

/// Response DTO for an attached photo
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PhotoResponseDto {
    pub id: Uuid,
    /// Absolute URL of the stored image
    pub url: String,
}

// =============================================================================
// UPLOADS
// =============================================================================

/// A file read from a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Allowed MIME types for pet photos
pub const ALLOWED_IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum photo size in bytes (10MB)
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Get file extension from content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Guess an image content type from a file name, for parts sent without one
pub fn get_content_type_from_file_name(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::core::config::MediaConfig;
    use crate::features::pets::models::Pet;

    #[test]
    fn test_content_type_from_file_name() {
        assert_eq!(get_content_type_from_file_name("cat.JPG"), Some("image/jpeg"));
        assert_eq!(get_content_type_from_file_name("cat.jpeg"), Some("image/jpeg"));
        assert_eq!(get_content_type_from_file_name("cat.png"), Some("image/png"));
        assert_eq!(get_content_type_from_file_name("cat.txt"), None);
        assert_eq!(get_content_type_from_file_name("cat"), None);
    }

    fn create_dto(value: serde_json::Value) -> CreatePetDto {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_create_dto_requires_all_fields() {
        let err = create_dto(serde_json::json!({ "name": "Rex" }))
            .into_new_pet()
            .unwrap_err();
        match err {
            AppError::InvalidFields(fields) => {
                assert_eq!(fields["age"], vec![MSG_FIELD_REQUIRED.to_string()]);
                assert_eq!(fields["type"], vec![MSG_FIELD_REQUIRED.to_string()]);
                assert!(!fields.contains_key("name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_create_dto_checks_name_length() {
        let err = create_dto(serde_json::json!({ "name": "", "age": 1, "type": 1 }))
            .into_new_pet()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFields(f) if f.contains_key("name")));

        let long_name = "x".repeat(51);
        let err = create_dto(serde_json::json!({ "name": long_name, "age": 1, "type": 1 }))
            .into_new_pet()
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFields(f) if f.contains_key("name")));
    }

    #[test]
    fn test_create_dto_accepts_complete_payload() {
        let new_pet = create_dto(serde_json::json!({ "name": "Rex", "age": 6, "type": 2 }))
            .into_new_pet()
            .unwrap();
        assert_eq!(new_pet.name, "Rex");
        assert_eq!(new_pet.age, 6);
        assert_eq!(new_pet.type_id, 2);
    }

    #[tokio::test]
    async fn test_pet_response_shape() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(
            &MediaConfig {
                root: dir.path().to_path_buf(),
                url_prefix: "/media".to_string(),
            },
            "http://testserver",
        )
        .await
        .unwrap();

        let pet_id = Uuid::new_v4();
        let photo_id = Uuid::new_v4();
        let created_at = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 15).unwrap();
        let model = PetWithPhotos {
            pet: Pet {
                id: pet_id,
                name: "Rex".to_string(),
                age: 6,
                type_id: 2,
                type_name: "dog".to_string(),
                created_at,
            },
            photos: vec![PetPhoto {
                id: photo_id,
                pet_id,
                image: "images/rex.jpg".to_string(),
                created_at,
            }],
        };

        let json = serde_json::to_value(PetResponseDto::from_model(model, &storage)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": pet_id,
                "name": "Rex",
                "age": 6,
                "type": "dog",
                "photos": [{ "id": photo_id, "image": "http://testserver/media/images/rex.jpg" }],
                "created_at": "2024-05-17T09:30:15",
            })
        );
    }
}
