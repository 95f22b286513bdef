use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::pets::models::{DeletedPets, NewPet, Pet, PetPhoto, PetType, PetWithPhotos};
use crate::features::pets::repositories::PetRepository;
use crate::shared::constants::MSG_PET_NOT_FOUND;

#[derive(Debug, Default)]
struct State {
    types: Vec<PetType>,
    /// Kept in insertion order
    pets: Vec<Pet>,
    photos: Vec<PetPhoto>,
}

impl State {
    fn has_photos(&self, pet_id: Uuid) -> bool {
        self.photos.iter().any(|photo| photo.pet_id == pet_id)
    }

    fn matching<'a>(&'a self, photo_filter: Option<bool>) -> impl Iterator<Item = &'a Pet> + 'a {
        self.pets.iter().filter(move |pet| match photo_filter {
            None => true,
            Some(wanted) => self.has_photos(pet.id) == wanted,
        })
    }
}

/// In-process [`PetRepository`] used by tests and local experiments
#[derive(Debug, Default)]
pub struct InMemoryPetRepository {
    state: RwLock<State>,
}

impl InMemoryPetRepository {
    pub fn new(types: Vec<PetType>) -> Self {
        Self {
            state: RwLock::new(State {
                types,
                ..State::default()
            }),
        }
    }

    /// Store seeded with the same types as the database migration
    pub fn with_default_types() -> Self {
        Self::new(vec![
            PetType {
                id: 1,
                name: "cat".to_string(),
            },
            PetType {
                id: 2,
                name: "dog".to_string(),
            },
        ])
    }

    pub async fn pet_count(&self) -> usize {
        self.state.read().await.pets.len()
    }

    pub async fn photo_count(&self) -> usize {
        self.state.read().await.photos.len()
    }

    /// Storage keys of all recorded photos
    pub async fn photo_keys(&self) -> Vec<String> {
        self.state
            .read()
            .await
            .photos
            .iter()
            .map(|photo| photo.image.clone())
            .collect()
    }
}

#[async_trait]
impl PetRepository for InMemoryPetRepository {
    async fn list_types(&self) -> Result<Vec<PetType>> {
        let mut types = self.state.read().await.types.clone();
        types.sort_by_key(|t| t.id);
        Ok(types)
    }

    async fn find_type(&self, type_id: i32) -> Result<Option<PetType>> {
        let state = self.state.read().await;
        Ok(state.types.iter().find(|t| t.id == type_id).cloned())
    }

    async fn create_pet(&self, new_pet: NewPet) -> Result<Pet> {
        let mut state = self.state.write().await;
        let type_name = state
            .types
            .iter()
            .find(|t| t.id == new_pet.type_id)
            .map(|t| t.name.clone())
            .ok_or_else(|| {
                AppError::Internal(format!("Pet type {} does not exist", new_pet.type_id))
            })?;

        let pet = Pet {
            id: Uuid::now_v7(),
            name: new_pet.name,
            age: new_pet.age,
            type_id: new_pet.type_id,
            type_name,
            created_at: Utc::now(),
        };
        state.pets.push(pet.clone());
        Ok(pet)
    }

    async fn find_pet(&self, pet_id: Uuid) -> Result<Option<Pet>> {
        let state = self.state.read().await;
        Ok(state.pets.iter().find(|p| p.id == pet_id).cloned())
    }

    async fn count_by_photo_presence(&self, photo_filter: Option<bool>) -> Result<i64> {
        let state = self.state.read().await;
        Ok(state.matching(photo_filter).count() as i64)
    }

    async fn page(
        &self,
        photo_filter: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PetWithPhotos>> {
        let state = self.state.read().await;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(state
            .matching(photo_filter)
            .skip(offset)
            .take(limit)
            .map(|pet| PetWithPhotos {
                pet: pet.clone(),
                photos: state
                    .photos
                    .iter()
                    .filter(|photo| photo.pet_id == pet.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn delete_pets(&self, ids: &[Uuid]) -> Result<DeletedPets> {
        let mut state = self.state.write().await;

        let (gone_pets, kept_pets): (Vec<Pet>, Vec<Pet>) = std::mem::take(&mut state.pets)
            .into_iter()
            .partition(|pet| ids.contains(&pet.id));
        state.pets = kept_pets;
        let removed: HashSet<Uuid> = gone_pets.into_iter().map(|pet| pet.id).collect();

        let (gone, kept): (Vec<PetPhoto>, Vec<PetPhoto>) = std::mem::take(&mut state.photos)
            .into_iter()
            .partition(|photo| ids.contains(&photo.pet_id));
        state.photos = kept;

        Ok(DeletedPets {
            removed,
            image_keys: gone.into_iter().map(|photo| photo.image).collect(),
        })
    }

    async fn add_photo(&self, pet_id: Uuid, photo_id: Uuid, image: &str) -> Result<PetPhoto> {
        let mut state = self.state.write().await;
        if !state.pets.iter().any(|p| p.id == pet_id) {
            return Err(AppError::Validation(MSG_PET_NOT_FOUND.to_string()));
        }

        let photo = PetPhoto {
            id: photo_id,
            pet_id,
            image: image.to_string(),
            created_at: Utc::now(),
        };
        state.photos.push(photo.clone());
        Ok(photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_pet(name: &str, type_id: i32) -> NewPet {
        NewPet {
            name: name.to_string(),
            age: 3,
            type_id,
        }
    }

    #[tokio::test]
    async fn test_page_follows_insertion_order() {
        let repo = InMemoryPetRepository::with_default_types();
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(repo.create_pet(new_pet(&format!("Pet{i}"), 1)).await.unwrap().id);
        }

        let page = repo.page(None, 1, 2).await.unwrap();
        let page_ids: Vec<Uuid> = page.iter().map(|p| p.pet.id).collect();
        assert_eq!(page_ids, ids[1..3].to_vec());
    }

    #[tokio::test]
    async fn test_photo_filter_counts() {
        let repo = InMemoryPetRepository::with_default_types();
        let with_photo = repo.create_pet(new_pet("A", 2)).await.unwrap();
        repo.create_pet(new_pet("B", 1)).await.unwrap();
        repo.add_photo(with_photo.id, Uuid::new_v4(), "images/a.jpg")
            .await
            .unwrap();

        assert_eq!(repo.count_by_photo_presence(None).await.unwrap(), 2);
        assert_eq!(repo.count_by_photo_presence(Some(true)).await.unwrap(), 1);
        assert_eq!(repo.count_by_photo_presence(Some(false)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_photos() {
        let repo = InMemoryPetRepository::with_default_types();
        let pet = repo.create_pet(new_pet("A", 2)).await.unwrap();
        let other = repo.create_pet(new_pet("B", 2)).await.unwrap();
        repo.add_photo(pet.id, Uuid::new_v4(), "images/a.jpg")
            .await
            .unwrap();
        repo.add_photo(other.id, Uuid::new_v4(), "images/b.jpg")
            .await
            .unwrap();

        let deleted = repo.delete_pets(&[pet.id]).await.unwrap();
        assert_eq!(deleted.removed, HashSet::from([pet.id]));
        assert_eq!(deleted.image_keys, vec!["images/a.jpg".to_string()]);
        assert_eq!(repo.photo_keys().await, vec!["images/b.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_reports_only_removed_ids() {
        let repo = InMemoryPetRepository::with_default_types();
        let pet = repo.create_pet(new_pet("A", 2)).await.unwrap();
        let unknown = Uuid::new_v4();

        let deleted = repo.delete_pets(&[pet.id, unknown]).await.unwrap();
        assert_eq!(deleted.removed, HashSet::from([pet.id]));

        let again = repo.delete_pets(&[pet.id]).await.unwrap();
        assert!(again.removed.is_empty());
    }

    #[tokio::test]
    async fn test_add_photo_to_missing_pet_fails() {
        let repo = InMemoryPetRepository::with_default_types();
        let result = repo
            .add_photo(Uuid::new_v4(), Uuid::new_v4(), "images/x.jpg")
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
