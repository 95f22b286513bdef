use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::pets::models::{DeletedPets, NewPet, Pet, PetPhoto, PetType, PetWithPhotos};

/// Port for pet, pet type and photo persistence.
///
/// `photo_filter` arguments select pets with at least one photo (`Some(true)`),
/// pets without photos (`Some(false)`) or all pets (`None`). Listing order is
/// insertion order.
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// All pet types ordered by id
    async fn list_types(&self) -> Result<Vec<PetType>>;

    async fn find_type(&self, type_id: i32) -> Result<Option<PetType>>;

    /// Insert a pet. The caller has already checked that the type exists.
    async fn create_pet(&self, new_pet: NewPet) -> Result<Pet>;

    async fn find_pet(&self, pet_id: Uuid) -> Result<Option<Pet>>;

    /// Number of pets matching the photo filter, ignoring pagination
    async fn count_by_photo_presence(&self, photo_filter: Option<bool>) -> Result<i64>;

    /// One page of pets matching the photo filter, with their photos
    async fn page(
        &self,
        photo_filter: Option<bool>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PetWithPhotos>>;

    /// Delete the given pets and their photo rows in one atomic step,
    /// returning the ids that were removed and the storage keys of their photos.
    /// Ids with no matching pet are left out of `removed`.
    async fn delete_pets(&self, ids: &[Uuid]) -> Result<DeletedPets>;

    /// Record a stored file as a photo of `pet_id`. Fails with a validation
    /// error when the pet does not exist.
    async fn add_photo(&self, pet_id: Uuid, photo_id: Uuid, image: &str) -> Result<PetPhoto>;
}
