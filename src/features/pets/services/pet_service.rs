use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::pets::dtos::{
    get_content_type_from_file_name, get_extension_from_content_type, CreatePetDto,
    DeleteErrorDto, DeletePetsDto, DeletePetsResponseDto, ListPetsQuery, PetListResponseDto,
    PetResponseDto, PetTypeResponseDto, PhotoResponseDto, UploadedFile,
    ALLOWED_IMAGE_MIME_TYPES, MAX_PHOTO_SIZE,
};
use crate::features::pets::models::PetWithPhotos;
use crate::features::pets::repositories::PetRepository;
use crate::modules::storage::LocalStorage;
use crate::shared::constants::{
    MSG_FIELD_REQUIRED, MSG_IDS_NOT_LIST, MSG_INCORRECT_ID, MSG_NO_FILE_ATTACHED,
    MSG_PET_NOT_FOUND, MSG_PHOTOS_ON_CREATE,
};
use crate::shared::query::{parse_photo_filter, Pagination};

/// Folder inside media storage that pet photos are written to
const PHOTO_FOLDER: &str = "images";

/// Service for pet operations
pub struct PetService {
    repository: Arc<dyn PetRepository>,
    storage: Arc<LocalStorage>,
}

impl PetService {
    pub fn new(repository: Arc<dyn PetRepository>, storage: Arc<LocalStorage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// List all pet types
    pub async fn list_types(&self) -> Result<Vec<PetTypeResponseDto>> {
        let types = self.repository.list_types().await?;
        Ok(types.into_iter().map(Into::into).collect())
    }

    /// Filtered, paginated pet list. `count` ignores pagination.
    pub async fn list(&self, query: &ListPetsQuery) -> Result<PetListResponseDto> {
        let pagination = Pagination::from_query(query.limit.as_deref(), query.offset.as_deref())?;
        let photo_filter = parse_photo_filter(query.has_photos.as_deref())?;

        let count = self
            .repository
            .count_by_photo_presence(photo_filter)
            .await?;
        let pets = self
            .repository
            .page(photo_filter, pagination.offset, pagination.limit)
            .await?;

        debug!(
            "Listed {} of {} pets (has_photos={:?}, offset={}, limit={})",
            pets.len(),
            count,
            photo_filter,
            pagination.offset,
            pagination.limit
        );

        Ok(PetListResponseDto {
            count,
            data: pets
                .into_iter()
                .map(|pet| PetResponseDto::from_model(pet, &self.storage))
                .collect(),
        })
    }

    /// Create a pet from a raw JSON object.
    ///
    /// Photos cannot be supplied here; they go through [`PetService::attach_photo`].
    pub async fn create(&self, payload: serde_json::Map<String, Value>) -> Result<PetResponseDto> {
        if payload.contains_key("photos") {
            return Err(AppError::Validation(MSG_PHOTOS_ON_CREATE.to_string()));
        }

        let dto: CreatePetDto = serde_json::from_value(Value::Object(payload))
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON data: {}", e)))?;
        let new_pet = dto.into_new_pet()?;

        if self.repository.find_type(new_pet.type_id).await?.is_none() {
            return Err(AppError::field(
                "type",
                format!("Invalid pk \"{}\" - object does not exist.", new_pet.type_id),
            ));
        }

        let pet = self.repository.create_pet(new_pet).await?;
        info!("Pet created: id={}, type={}", pet.id, pet.type_name);

        Ok(PetResponseDto::from_model(
            PetWithPhotos {
                pet,
                photos: Vec::new(),
            },
            &self.storage,
        ))
    }

    /// Resolve a path id to an existing pet
    pub async fn require_pet(&self, raw_id: &str) -> Result<Uuid> {
        let pet_id = parse_pet_id(raw_id)
            .ok_or_else(|| AppError::Validation(MSG_INCORRECT_ID.to_string()))?;

        match self.repository.find_pet(pet_id).await? {
            Some(pet) => Ok(pet.id),
            None => Err(AppError::Validation(MSG_PET_NOT_FOUND.to_string())),
        }
    }

    /// Store an uploaded image and record it as a photo of `pet_id`
    pub async fn attach_photo(
        &self,
        pet_id: Uuid,
        file: Option<UploadedFile>,
    ) -> Result<PhotoResponseDto> {
        let file = file.ok_or_else(|| AppError::Parse(MSG_NO_FILE_ATTACHED.to_string()))?;

        if file.data.is_empty() {
            return Err(AppError::BadRequest("The submitted file is empty".to_string()));
        }

        if file.data.len() > MAX_PHOTO_SIZE {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                MAX_PHOTO_SIZE,
                MAX_PHOTO_SIZE / 1024 / 1024
            )));
        }

        let content_type = resolve_image_content_type(&file).ok_or_else(|| {
            AppError::BadRequest(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                file.content_type,
                ALLOWED_IMAGE_MIME_TYPES.join(", ")
            ))
        })?;
        let extension = get_extension_from_content_type(content_type).unwrap_or("bin");

        let photo_id = Uuid::new_v4();
        let key = LocalStorage::generate_key(PHOTO_FOLDER, &photo_id.to_string(), extension);
        self.storage.upload(&key, &file.data).await?;

        let photo = match self.repository.add_photo(pet_id, photo_id, &key).await {
            Ok(photo) => photo,
            Err(e) => {
                // The pet may have been deleted while the file was being written
                self.remove_files(vec![key]).await;
                return Err(e);
            }
        };

        info!(
            "Photo attached: id={}, pet_id={}, key={}, size={}",
            photo.id,
            pet_id,
            photo.image,
            file.data.len()
        );

        Ok(PhotoResponseDto {
            id: photo.id,
            url: self.storage.get_file_url(&photo.image),
        })
    }

    /// Delete a batch of pets, reporting per-id problems instead of failing
    pub async fn delete_many(&self, dto: DeletePetsDto) -> Result<DeletePetsResponseDto> {
        let ids = match dto.ids {
            Some(ids) if !is_blank(&ids) => ids,
            _ => return Err(AppError::field("ids", MSG_FIELD_REQUIRED)),
        };
        let Value::Array(ids) = ids else {
            return Err(AppError::Validation(MSG_IDS_NOT_LIST.to_string()));
        };

        let parsed: Vec<(Value, Option<Uuid>)> = ids
            .into_iter()
            .map(|raw| {
                let id = raw.as_str().and_then(parse_pet_id);
                (raw, id)
            })
            .collect();

        let mut unique: Vec<Uuid> = parsed.iter().filter_map(|(_, id)| *id).collect();
        unique.sort_unstable();
        unique.dedup();

        // Only rows removed by this call count as deleted
        let outcome = self.repository.delete_pets(&unique).await?;

        let mut errors = Vec::new();
        let mut deleted = 0;
        for (raw, id) in parsed {
            match id {
                None => errors.push(DeleteErrorDto {
                    id: raw,
                    error: MSG_INCORRECT_ID.to_string(),
                }),
                Some(id) if !outcome.removed.contains(&id) => errors.push(DeleteErrorDto {
                    id: raw,
                    error: MSG_PET_NOT_FOUND.to_string(),
                }),
                Some(_) => deleted += 1,
            }
        }

        let photo_count = outcome.image_keys.len();
        self.remove_files(outcome.image_keys).await;

        info!(
            "Bulk delete: deleted={}, photos={}, errors={}",
            deleted,
            photo_count,
            errors.len()
        );

        Ok(DeletePetsResponseDto {
            deleted,
            errors,
        })
    }

    /// Delete a single pet with its photos
    pub async fn delete_one(&self, raw_id: &str) -> Result<()> {
        let pet_id = parse_pet_id(raw_id)
            .ok_or_else(|| AppError::Validation(MSG_INCORRECT_ID.to_string()))?;

        let deleted = self.repository.delete_pets(&[pet_id]).await?;
        if deleted.removed.is_empty() {
            return Err(AppError::Validation(MSG_PET_NOT_FOUND.to_string()));
        }
        self.remove_files(deleted.image_keys).await;

        info!("Pet deleted: id={}", pet_id);
        Ok(())
    }

    /// Remove stored files after their rows are gone. Failures leave an orphan
    /// file behind and are only logged.
    async fn remove_files(&self, keys: Vec<String>) {
        for key in keys {
            if let Err(e) = self.storage.delete(&key).await {
                warn!("Failed to remove photo file '{}': {}", key, e);
            }
        }
    }
}

fn parse_pet_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Values a client may send that count as "not provided"
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Declared content type if it is an allowed image type, otherwise a guess
/// from the file name for parts sent without a usable type
fn resolve_image_content_type(file: &UploadedFile) -> Option<&'static str> {
    if let Some(allowed) = ALLOWED_IMAGE_MIME_TYPES
        .iter()
        .copied()
        .find(|t| *t == file.content_type)
    {
        return Some(allowed);
    }

    match file.content_type.as_str() {
        "" | "application/octet-stream" => get_content_type_from_file_name(&file.file_name),
        _ => None,
    }
}
