//! Command-line client for the pets API.
//!
//! Fetches every pet (optionally filtered by photo presence) and prints them
//! with each photo reduced to its URL.

mod error;
mod output;
mod pets_client;

pub use error::ClientError;
pub use output::{flatten_pets, parse_bool, render};
pub use pets_client::PetsClient;

/// Fetch pets and produce the text printed to stdout
pub async fn fetch_and_render(
    client: &PetsClient,
    has_photos: Option<bool>,
) -> Result<String, ClientError> {
    let pets = client.fetch_pets(has_photos).await?;
    render(&flatten_pets(pets))
}
