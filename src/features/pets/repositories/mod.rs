mod in_memory_pet_repository;
mod pet_repository;
mod pg_pet_repository;

pub use in_memory_pet_repository::InMemoryPetRepository;
pub use pet_repository::PetRepository;
pub use pg_pet_repository::PgPetRepository;
