mod pet;

pub use pet::{DeletedPets, NewPet, Pet, PetPhoto, PetType, PetWithPhotos};
