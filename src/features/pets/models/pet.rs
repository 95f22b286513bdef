use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a pet variety
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PetType {
    pub id: i32,
    pub name: String,
}

/// Database model for a pet, joined with its type name
#[derive(Debug, Clone, FromRow)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub age: i32,
    pub type_id: i32,
    pub type_name: String,
    pub created_at: DateTime<Utc>,
}

/// Database model for a photo attached to a pet
#[derive(Debug, Clone, FromRow)]
pub struct PetPhoto {
    pub id: Uuid,
    pub pet_id: Uuid,
    /// Media storage key, e.g. `images/<id>.jpg`
    pub image: String,
    pub created_at: DateTime<Utc>,
}

/// A pet together with its photos, as listed by `GET /pets`
#[derive(Debug, Clone)]
pub struct PetWithPhotos {
    pub pet: Pet,
    pub photos: Vec<PetPhoto>,
}

/// Fields needed to insert a pet
#[derive(Debug, Clone)]
pub struct NewPet {
    pub name: String,
    pub age: i32,
    pub type_id: i32,
}

/// Outcome of an atomic pet deletion
#[derive(Debug, Default)]
pub struct DeletedPets {
    /// Ids of the pet rows this call actually removed
    pub removed: HashSet<Uuid>,
    /// Storage keys of the photos removed along with them
    pub image_keys: Vec<String>,
}
