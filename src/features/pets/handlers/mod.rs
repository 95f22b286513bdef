mod pet_handler;

pub use pet_handler::*;
