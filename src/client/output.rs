use serde::Serialize;
use serde_json::{json, Value};

use super::error::ClientError;

/// Boolean argument parser accepting the usual command-line spellings
pub fn parse_bool(arg: &str) -> Result<bool, String> {
    match arg.to_lowercase().as_str() {
        "yes" | "true" | "t" | "y" | "1" => Ok(true),
        "no" | "false" | "f" | "n" | "0" => Ok(false),
        _ => Err("Boolean value expected.".to_string()),
    }
}

/// Wrap pets as `{"pets": [...]}`, replacing each photo object with its image URL
pub fn flatten_pets(pets: Vec<Value>) -> Value {
    let pets: Vec<Value> = pets
        .into_iter()
        .map(|mut pet| {
            if let Some(photos) = pet.get_mut("photos").and_then(Value::as_array_mut) {
                for photo in photos.iter_mut() {
                    let image = photo.get("image").cloned().unwrap_or(Value::Null);
                    *photo = image;
                }
            }
            pet
        })
        .collect();

    json!({ "pets": pets })
}

/// Pretty-print with a 4-space indent
pub fn render(value: &Value) -> Result<String, ClientError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| ClientError::Decode(e.to_string()))?;

    String::from_utf8(buf).map_err(|e| ClientError::Decode(e.to_string()))
}
