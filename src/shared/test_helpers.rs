#[cfg(test)]
use std::path::Path;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use axum::http::{HeaderName, HeaderValue};
#[cfg(test)]
use axum::Router;
#[cfg(test)]
use axum_test::multipart::{MultipartForm, Part};
#[cfg(test)]
use axum_test::TestServer;
#[cfg(test)]
use fake::{faker::name::en::FirstName, Fake};
#[cfg(test)]
use tempfile::TempDir;
#[cfg(test)]
use uuid::Uuid;

#[cfg(test)]
use crate::core::config::{
    ApiKeyConfig, AppConfig, Config, DatabaseConfig, MediaConfig, SwaggerConfig,
};
#[cfg(test)]
use crate::core::router::build_router;
#[cfg(test)]
use crate::features::pets::dtos::UploadedFile;
#[cfg(test)]
use crate::features::pets::repositories::{InMemoryPetRepository, PetRepository};
#[cfg(test)]
use crate::features::pets::models::NewPet;
#[cfg(test)]
use crate::features::pets::PetService;
#[cfg(test)]
use crate::modules::storage::LocalStorage;

#[cfg(test)]
pub const TEST_API_KEY: &str = "test-api-key";

#[cfg(test)]
pub const TEST_BASE_URL: &str = "http://testserver";

/// Smallest byte sequence that still looks like a JPEG (SOI + EOI markers)
#[cfg(test)]
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9];

/// Service wired to an in-memory repository and a throwaway media directory
#[cfg(test)]
pub struct TestContext {
    pub config: Config,
    pub repository: Arc<InMemoryPetRepository>,
    pub storage: Arc<LocalStorage>,
    pub service: Arc<PetService>,
    // Dropped last; removes the media directory
    _media_dir: TempDir,
}

#[cfg(test)]
#[allow(dead_code)]
impl TestContext {
    pub fn router(&self) -> Router {
        build_router(&self.config, Arc::clone(&self.service), self.storage.root())
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("test server")
    }

    pub fn media_root(&self) -> &Path {
        self.storage.root()
    }
}

#[cfg(test)]
pub fn test_config(media_root: &Path) -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_allowed_origins: vec!["*".to_string()],
            max_request_body_size: 10 * 1024 * 1024,
            public_base_url: TEST_BASE_URL.to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 1,
            idle_timeout_secs: 1,
            max_lifetime_secs: 1,
        },
        api_key: ApiKeyConfig {
            header: "X-API-KEY".to_string(),
            key: TEST_API_KEY.to_string(),
        },
        media: MediaConfig {
            root: media_root.to_path_buf(),
            url_prefix: "/media".to_string(),
        },
        swagger: SwaggerConfig {
            username: None,
            password: None,
            title: "Pets API".to_string(),
            version: "test".to_string(),
            description: "test".to_string(),
        },
    }
}

#[cfg(test)]
pub async fn test_context() -> TestContext {
    let media_dir = tempfile::tempdir().expect("media dir");
    let config = test_config(media_dir.path());

    let repository = Arc::new(InMemoryPetRepository::with_default_types());
    let storage = Arc::new(
        LocalStorage::new(&config.media, &config.app.public_base_url)
            .await
            .expect("media storage"),
    );
    let service = Arc::new(PetService::new(
        Arc::clone(&repository) as Arc<dyn PetRepository>,
        Arc::clone(&storage),
    ));

    TestContext {
        config,
        repository,
        storage,
        service,
        _media_dir: media_dir,
    }
}

#[cfg(test)]
#[allow(dead_code)]
pub fn api_key_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-api-key"),
        HeaderValue::from_static(TEST_API_KEY),
    )
}

#[cfg(test)]
#[allow(dead_code)]
pub fn fake_pet(type_id: i32) -> NewPet {
    NewPet {
        name: FirstName().fake(),
        age: (1..20).fake(),
        type_id,
    }
}

#[cfg(test)]
pub fn jpeg_upload() -> UploadedFile {
    UploadedFile {
        data: JPEG_BYTES.to_vec(),
        file_name: "pet.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
    }
}

#[cfg(test)]
#[allow(dead_code)]
pub fn jpeg_form() -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(JPEG_BYTES.to_vec())
            .file_name("pet.jpg")
            .mime_type("image/jpeg"),
    )
}

/// Create `with_photos` pets holding one photo each, then `without_photos`
/// bare pets. Returns ids in creation order.
#[cfg(test)]
pub async fn seed_pets(ctx: &TestContext, with_photos: usize, without_photos: usize) -> Vec<Uuid> {
    let mut ids = Vec::with_capacity(with_photos + without_photos);

    for i in 0..with_photos + without_photos {
        let pet = ctx
            .repository
            .create_pet(fake_pet(if i % 2 == 0 { 1 } else { 2 }))
            .await
            .expect("create pet");

        if i < with_photos {
            ctx.service
                .attach_photo(pet.id, Some(jpeg_upload()))
                .await
                .expect("attach photo");
        }
        ids.push(pet.id);
    }

    ids
}
