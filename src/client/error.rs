use thiserror::Error;

/// Failures surfaced to the user by the pets client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server rejected the API key.
    #[error("API KEY is not valid")]
    Unauthorized,

    /// Server could not be reached.
    #[error("ERROR: Server is not available")]
    Unavailable(#[source] reqwest::Error),

    /// Any other non-success answer; carries the server message when there is one.
    #[error("{message}")]
    UnexpectedStatus { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("Failed to decode server response: {0}")]
    Decode(String),

    /// Configured API key header or value cannot be sent.
    #[error("Invalid API key setting: {0}")]
    InvalidApiKey(String),
}
