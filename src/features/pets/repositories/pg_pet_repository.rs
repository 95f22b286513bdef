use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::pets::models::{DeletedPets, NewPet, Pet, PetPhoto, PetType, PetWithPhotos};
use crate::features::pets::repositories::PetRepository;
use crate::shared::constants::MSG_PET_NOT_FOUND;

/// Postgres error code for a violated foreign key
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// `$1` is the optional photo filter
const PHOTO_FILTER_CLAUSE: &str = r#"
    ($1::BOOLEAN IS NULL
     OR EXISTS (SELECT 1 FROM pet_photos ph WHERE ph.pet_id = p.id) = $1)
"#;

/// PostgreSQL adapter for [`PetRepository`]
pub struct PgPetRepository {
    pool: PgPool,
}

impl PgPetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn photos_for(&self, pet_ids: &[Uuid]) -> Result<Vec<PetPhoto>> {
        if pet_ids.is_empty() {
            return Ok(Vec::new());
        }

        let photos = sqlx::query_as::<_, PetPhoto>(
            r#"
            SELECT id, pet_id, image, created_at
            FROM pet_photos
            WHERE pet_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(pet_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load pet photos: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(photos)
    }
}

#[async_trait]
impl PetRepository for PgPetRepository {
    async fn list_types(&self) -> Result<Vec<PetType>> {
        let types = sqlx::query_as::<_, PetType>("SELECT id, name FROM pet_types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(types)
    }

    async fn find_type(&self, type_id: i32) -> Result<Option<PetType>> {
        let pet_type = sqlx::query_as::<_, PetType>("SELECT id, name FROM pet_types WHERE id = $1")
            .bind(type_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(pet_type)
    }

    async fn create_pet(&self, new_pet: NewPet) -> Result<Pet> {
        let pet = sqlx::query_as::<_, Pet>(
            r#"
            WITH inserted AS (
                INSERT INTO pets (id, name, age, type_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, age, type_id, created_at
            )
            SELECT i.id, i.name, i.age, i.type_id, t.name AS type_name, i.created_at
            FROM inserted i
            JOIN pet_types t ON t.id = i.type_id
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&new_pet.name)
        .bind(new_pet.age)
        .bind(new_pet.type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert pet: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(pet)
    }

    async fn find_pet(&self, pet_id: Uuid) -> Result<Option<Pet>> {
        let pet = sqlx::query_as::<_, Pet>(
            r#"
            SELECT p.id, p.name, p.age, p.type_id, t.name AS type_name, p.created_at
            FROM pets p
            JOIN pet_types t ON t.id = p.type_id
            WHERE p.id = $1
            "#,
        )
        .bind(pet_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pet)
    }

    async fn count_by_photo_presence(&self, photo_filter: Option<bool>) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM pets p WHERE {}", PHOTO_FILTER_CLAUSE);
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .bind(photo_filter)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn page(
        &self,
        photo_filter: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PetWithPhotos>> {
        let sql = format!(
            r#"
            SELECT p.id, p.name, p.age, p.type_id, t.name AS type_name, p.created_at
            FROM pets p
            JOIN pet_types t ON t.id = p.type_id
            WHERE {}
            ORDER BY p.id
            OFFSET $2
            LIMIT $3
            "#,
            PHOTO_FILTER_CLAUSE
        );

        let pets = sqlx::query_as::<_, Pet>(&sql)
            .bind(photo_filter)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list pets: {:?}", e);
                AppError::Database(e)
            })?;

        let ids: Vec<Uuid> = pets.iter().map(|p| p.id).collect();
        let mut photos_by_pet: HashMap<Uuid, Vec<PetPhoto>> = HashMap::new();
        for photo in self.photos_for(&ids).await? {
            photos_by_pet.entry(photo.pet_id).or_default().push(photo);
        }

        Ok(pets
            .into_iter()
            .map(|pet| {
                let photos = photos_by_pet.remove(&pet.id).unwrap_or_default();
                PetWithPhotos { pet, photos }
            })
            .collect())
    }

    async fn delete_pets(&self, ids: &[Uuid]) -> Result<DeletedPets> {
        if ids.is_empty() {
            return Ok(DeletedPets::default());
        }

        let mut tx = self.pool.begin().await?;

        let image_keys = sqlx::query_scalar::<_, String>(
            "DELETE FROM pet_photos WHERE pet_id = ANY($1) RETURNING image",
        )
        .bind(ids)
        .fetch_all(&mut *tx)
        .await?;

        let removed: HashSet<Uuid> =
            sqlx::query_scalar::<_, Uuid>("DELETE FROM pets WHERE id = ANY($1) RETURNING id")
                .bind(ids)
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();

        tx.commit().await?;

        debug!(
            "Deleted {} pet rows and {} photo rows",
            removed.len(),
            image_keys.len()
        );

        Ok(DeletedPets {
            removed,
            image_keys,
        })
    }

    async fn add_photo(&self, pet_id: Uuid, photo_id: Uuid, image: &str) -> Result<PetPhoto> {
        let photo = sqlx::query_as::<_, PetPhoto>(
            r#"
            INSERT INTO pet_photos (id, pet_id, image)
            VALUES ($1, $2, $3)
            RETURNING id, pet_id, image, created_at
            "#,
        )
        .bind(photo_id)
        .bind(pet_id)
        .bind(image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let is_missing_pet = e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);

            if is_missing_pet {
                AppError::Validation(MSG_PET_NOT_FOUND.to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::core::database::run_migrations;

    /// Needs a disposable Postgres at `DATABASE_URL`:
    /// `cargo test -- --ignored pg_pet_repository`
    async fn repository() -> PgPetRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.expect("Failed to connect");
        run_migrations(&pool).await.expect("Failed to migrate");
        PgPetRepository::new(pool)
    }

    fn new_pet(name: &str, type_id: i32) -> NewPet {
        NewPet {
            name: name.to_string(),
            age: 4,
            type_id,
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_queries_against_postgres() {
        let repo = repository().await;

        let types = repo.list_types().await.unwrap();
        assert!(types.iter().any(|t| t.id == 1 && t.name == "cat"));
        assert_eq!(repo.find_type(2).await.unwrap().unwrap().name, "dog");
        assert!(repo.find_type(-1).await.unwrap().is_none());

        let with_before = repo.count_by_photo_presence(Some(true)).await.unwrap();
        let without_before = repo.count_by_photo_presence(Some(false)).await.unwrap();

        let with_photo = repo.create_pet(new_pet("Photo", 1)).await.unwrap();
        let bare = repo.create_pet(new_pet("Bare", 2)).await.unwrap();
        assert_eq!(with_photo.type_name, "cat");
        assert_eq!(repo.find_pet(bare.id).await.unwrap().unwrap().name, "Bare");

        let key = format!("images/{}.jpg", Uuid::new_v4());
        let photo = repo
            .add_photo(with_photo.id, Uuid::new_v4(), &key)
            .await
            .unwrap();
        assert_eq!(photo.pet_id, with_photo.id);

        assert_eq!(
            repo.count_by_photo_presence(Some(true)).await.unwrap(),
            with_before + 1
        );
        assert_eq!(
            repo.count_by_photo_presence(Some(false)).await.unwrap(),
            without_before + 1
        );

        let total = repo.count_by_photo_presence(None).await.unwrap();
        let page = repo.page(None, 0, total).await.unwrap();
        let listed = page
            .iter()
            .find(|p| p.pet.id == with_photo.id)
            .expect("pet with photo is listed");
        assert_eq!(listed.photos.len(), 1);
        assert_eq!(listed.photos[0].image, key);

        let unknown = Uuid::new_v4();
        let deleted = repo
            .delete_pets(&[with_photo.id, bare.id, unknown])
            .await
            .unwrap();
        assert_eq!(deleted.removed, HashSet::from([with_photo.id, bare.id]));
        assert_eq!(deleted.image_keys, vec![key]);
        assert!(repo.find_pet(with_photo.id).await.unwrap().is_none());

        let err = repo
            .add_photo(with_photo.id, Uuid::new_v4(), "images/gone.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg == MSG_PET_NOT_FOUND));
    }
}
