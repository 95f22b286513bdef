use axum::{
    body::{Body, Bytes},
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::{header, request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;

/// JSON body extractor whose rejections use the service error body
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

/// JSON body extractor that yields `T::default()` for an empty body.
///
/// Non-empty bodies get the same checks and error messages as [`AppJson`].
pub struct AppJsonOrDefault<T>(pub T);

impl<T, S> FromRequest<S> for AppJsonOrDefault<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = has_json_content_type(req.headers());
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {}", e)))?;

        if bytes.is_empty() {
            return Ok(Self(T::default()));
        }
        if !is_json {
            return Err(AppError::BadRequest(
                "Missing JSON content type: Expected request with `Content-Type: application/json`"
                    .to_string(),
            ));
        }

        match Json::<T>::from_bytes(&bytes) {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().to_ascii_lowercase())
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    let message = match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
        JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
        JsonRejection::MissingJsonContentType(err) => {
            format!("Missing JSON content type: {}", err)
        }
        _ => "Failed to parse JSON body".to_string(),
    };

    AppError::BadRequest(message)
}

/// Query string extractor with the same error body as [`AppJson`]
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(QueryRejection::FailedToDeserializeQueryString(err)) => Err(AppError::BadRequest(
                format!("Invalid query string: {}", err.body_text()),
            )),
            Err(_) => Err(AppError::BadRequest("Invalid query string".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{self, StatusCode};
    use axum::response::IntoResponse;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    struct Payload {
        name: String,
    }

    fn json_request(body: &str) -> Request<Body> {
        http::Request::builder()
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_syntax_error_is_bad_request() {
        let err = AppJson::<Payload>::from_request(json_request("{"), &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.starts_with("Invalid JSON syntax")));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let request = http::Request::builder().body(Body::from("{}")).unwrap();
        let err = AppJson::<Payload>::from_request(request, &()).await.err().unwrap();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_body_yields_default() {
        let request = http::Request::builder().body(Body::empty()).unwrap();
        let AppJsonOrDefault(payload) = AppJsonOrDefault::<Payload>::from_request(request, &())
            .await
            .unwrap();
        assert!(payload.name.is_empty());
    }

    #[tokio::test]
    async fn test_or_default_still_parses_and_rejects_json() {
        let AppJsonOrDefault(payload) =
            AppJsonOrDefault::<Payload>::from_request(json_request(r#"{"name":"Rex"}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.name, "Rex");

        let err = AppJsonOrDefault::<Payload>::from_request(json_request("{"), &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.starts_with("Invalid JSON syntax")));

        let request = http::Request::builder().body(Body::from("{}")).unwrap();
        let err = AppJsonOrDefault::<Payload>::from_request(request, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.starts_with("Missing JSON content type")));
    }
}
