use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Field name -> messages, e.g. `{"ids": ["This field is required."]}`
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    /// Per-field detail, present for field-level validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_fields(errors: FieldErrors) -> Self {
        let message = errors
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            message,
            errors: Some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_fields_summarizes_message() {
        let mut errors = FieldErrors::new();
        errors.insert("age".to_string(), vec!["This field is required.".to_string()]);
        errors.insert("name".to_string(), vec!["This field is required.".to_string()]);

        let body = ErrorResponse::with_fields(errors);
        assert_eq!(
            body.message,
            "age: This field is required.; name: This field is required."
        );
        assert_eq!(body.errors.unwrap().len(), 2);
    }

    #[test]
    fn test_plain_error_omits_field_map() {
        let json = serde_json::to_value(ErrorResponse::new("Incorrect ID")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Incorrect ID" }));
    }
}
