use axum::{
    extract::{multipart::MultipartRejection, Form, FromRequest, Multipart, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::AppError;
use crate::core::extractor::{AppJson, AppJsonOrDefault, AppQuery};
use crate::features::pets::dtos::{
    CreatePetDto, DeletePetsDto, DeletePetsResponseDto, ListPetsQuery, PetListResponseDto,
    PetResponseDto, PetTypeResponseDto, PhotoResponseDto, UploadPhotoDto, UploadedFile,
};
use crate::features::pets::services::PetService;
use crate::shared::types::ErrorResponse;

/// List pets
///
/// `count` is the number of pets matching `has_photos`, independent of
/// `limit` and `offset`.
#[utoipa::path(
    get,
    path = "/pets",
    tag = "pets",
    params(ListPetsQuery),
    responses(
        (status = 200, description = "Page of pets", body = PetListResponseDto),
        (status = 400, description = "Invalid has_photos, limit or offset", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_pets(
    State(service): State<Arc<PetService>>,
    AppQuery(query): AppQuery<ListPetsQuery>,
) -> Result<Json<PetListResponseDto>, AppError> {
    let response = service.list(&query).await?;
    Ok(Json(response))
}

/// Create a pet
///
/// Accepts JSON, urlencoded or multipart bodies. Photos are attached
/// afterwards with `POST /pets/{id}/photo`.
#[utoipa::path(
    post,
    path = "/pets",
    tag = "pets",
    request_body = CreatePetDto,
    responses(
        (status = 201, description = "Pet created", body = PetResponseDto),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn create_pet(
    State(service): State<Arc<PetService>>,
    request: Request,
) -> Result<(StatusCode, Json<PetResponseDto>), AppError> {
    let payload = read_create_payload(request).await?;
    let response = service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Numeric fields of a create request that arrive as text in form bodies
const NUMERIC_FORM_FIELDS: &[&str] = &["age", "type"];

async fn read_create_payload(request: Request) -> Result<Map<String, Value>, AppError> {
    match mime_type(request.headers()).as_deref() {
        Some("multipart/form-data") => {
            let multipart = Multipart::from_request(request, &()).await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read multipart data: {}", e))
            })?;
            read_form_fields(multipart).await
        }
        Some("application/x-www-form-urlencoded") => {
            let Form(fields) = Form::<Vec<(String, String)>>::from_request(request, &())
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read form data: {}", e)))?;
            Ok(fields
                .into_iter()
                .map(|(name, text)| {
                    let value = form_value(&name, text);
                    (name, value)
                })
                .collect())
        }
        _ => {
            let AppJson(payload) = AppJson::<Map<String, Value>>::from_request(request, &()).await?;
            Ok(payload)
        }
    }
}

/// Text parts become field values. File parts only record their file name,
/// which is enough for the service to reject a `photos` upload.
async fn read_form_fields(mut multipart: Multipart) -> Result<Map<String, Value>, AppError> {
    let mut fields = Map::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let name = field.name().unwrap_or("").to_string();
        let value = match field.file_name() {
            Some(file_name) => Value::String(file_name.to_string()),
            None => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read multipart data: {}", e))
                })?;
                form_value(&name, text)
            }
        };
        fields.insert(name, value);
    }

    Ok(fields)
}

fn form_value(name: &str, text: String) -> Value {
    if NUMERIC_FORM_FIELDS.contains(&name) {
        if let Ok(number) = text.trim().parse::<i64>() {
            return Value::from(number);
        }
    }
    Value::String(text)
}

fn mime_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
}

/// Delete several pets
///
/// Ids that are malformed or unknown are reported in `errors`; the rest are
/// deleted together with their photos. A request without a body is treated
/// as one without `ids`.
#[utoipa::path(
    delete,
    path = "/pets",
    tag = "pets",
    request_body = DeletePetsDto,
    responses(
        (status = 200, description = "Delete report", body = DeletePetsResponseDto),
        (status = 400, description = "ids missing or not a list", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn delete_pets(
    State(service): State<Arc<PetService>>,
    AppJsonOrDefault(dto): AppJsonOrDefault<DeletePetsDto>,
) -> Result<Json<DeletePetsResponseDto>, AppError> {
    let response = service.delete_many(dto).await?;
    Ok(Json(response))
}

/// Delete a single pet
#[utoipa::path(
    delete,
    path = "/pets/{id}",
    tag = "pets",
    params(
        ("id" = String, Path, description = "Pet id")
    ),
    responses(
        (status = 204, description = "Pet deleted"),
        (status = 400, description = "Malformed or unknown id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn delete_pet(
    State(service): State<Arc<PetService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    service.delete_one(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach a photo to a pet
///
/// Accepts multipart/form-data with a single `file` part holding a JPEG,
/// PNG, GIF or WebP image.
#[utoipa::path(
    post,
    path = "/pets/{id}/photo",
    tag = "pets",
    params(
        ("id" = String, Path, description = "Pet id")
    ),
    request_body(
        content = UploadPhotoDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Photo stored", body = PhotoResponseDto),
        (status = 400, description = "Unknown pet, missing file or rejected image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse),
        (status = 413, description = "File too large")
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn upload_photo(
    State(service): State<Arc<PetService>>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoResponseDto>, AppError> {
    let pet_id = service.require_pet(&id).await?;

    let file = match multipart {
        Ok(multipart) => read_file_part(multipart).await?,
        Err(rejection) => {
            debug!("Photo request is not multipart: {}", rejection);
            None
        }
    };

    let response = service.attach_photo(pet_id, file).await?;
    Ok(Json(response))
}

/// Pull the `file` part out of the form, ignoring anything else
async fn read_file_part(mut multipart: Multipart) -> Result<Option<UploadedFile>, AppError> {
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "file" {
            debug!("Ignoring unknown field: {}", field_name);
            continue;
        }

        let content_type = field.content_type().unwrap_or("").to_string();
        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let data = field.bytes().await.map_err(|e| {
            debug!("Failed to read file bytes: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        file = Some(UploadedFile {
            data: data.to_vec(),
            file_name,
            content_type,
        });
    }

    Ok(file)
}

/// List pet types
#[utoipa::path(
    get,
    path = "/pet-types",
    tag = "pet-types",
    responses(
        (status = 200, description = "All pet types", body = Vec<PetTypeResponseDto>),
        (status = 401, description = "Missing or invalid API key", body = ErrorResponse)
    ),
    security(
        ("api_key" = [])
    )
)]
pub async fn list_pet_types(
    State(service): State<Arc<PetService>>,
) -> Result<Json<Vec<PetTypeResponseDto>>, AppError> {
    let types = service.list_types().await?;
    Ok(Json(types))
}
