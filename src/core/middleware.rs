use crate::core::config::ApiKeyConfig;
use crate::core::error::AppError;
use crate::shared::constants::MSG_INVALID_API_KEY;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // If origins list contains "*", allow any origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub fn basic_auth_middleware(
    valid_credentials: Arc<String>,
) -> impl Fn(
    Request,
    Next,
)
    -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, Response>> + Send>>
       + Clone {
    move |req: Request, next: Next| {
        let credentials = valid_credentials.clone();
        Box::pin(async move {
            let provided = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|header| header.to_str().ok())
                .and_then(|value| value.strip_prefix("Basic "))
                .and_then(|encoded| BASE64_STANDARD.decode(encoded).ok())
                .and_then(|decoded| String::from_utf8(decoded).ok());

            if provided.as_deref() == Some(credentials.as_str()) {
                return Ok(next.run(req).await);
            }

            Err((
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")],
                "Unauthorized",
            )
                .into_response())
        })
    }
}

/// Reject requests whose API key header is missing or does not match
pub async fn api_key_middleware(
    State(api_key): State<Arc<ApiKeyConfig>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(api_key.header.as_str())
        .and_then(|h| h.to_str().ok());

    if provided != Some(api_key.key.as_str()) {
        tracing::debug!(
            "Rejected {} {}: {} header {}",
            req.method(),
            req.uri().path(),
            api_key.header,
            if provided.is_some() { "mismatch" } else { "missing" }
        );
        return Err(AppError::Unauthorized {
            message: MSG_INVALID_API_KEY.to_string(),
            header: api_key.header.clone(),
        });
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn_with_state, routing::get, Router};
    use axum_test::TestServer;

    fn guarded_server() -> TestServer {
        let config = Arc::new(ApiKeyConfig {
            header: "X-API-KEY".to_string(),
            key: "secret".to_string(),
        });
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route_layer(from_fn_with_state(config, api_key_middleware));
        TestServer::new(app).expect("test server")
    }

    #[tokio::test]
    async fn test_api_key_accepted() {
        let server = guarded_server();
        let response = server
            .get("/")
            .add_header(
                header::HeaderName::from_static("x-api-key"),
                HeaderValue::from_static("secret"),
            )
            .await;
        response.assert_status_ok();
        response.assert_text("ok");
    }

    #[tokio::test]
    async fn test_api_key_missing_or_wrong() {
        let server = guarded_server();

        let response = server.get("/").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.header(header::WWW_AUTHENTICATE), "X-API-KEY");
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], MSG_INVALID_API_KEY);

        let response = server
            .get("/")
            .add_header(
                header::HeaderName::from_static("x-api-key"),
                HeaderValue::from_static("wrong"),
            )
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_basic_auth_guards_swagger() {
        let app = Router::new()
            .route("/docs", get(|| async { "docs" }))
            .layer(axum::middleware::from_fn(basic_auth_middleware(Arc::new(
                "admin:pw".to_string(),
            ))));
        let server = TestServer::new(app).expect("test server");

        server
            .get("/docs")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let encoded = BASE64_STANDARD.encode("admin:pw");
        server
            .get("/docs")
            .add_header(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Basic {}", encoded)).unwrap(),
            )
            .await
            .assert_status_ok();
    }
}
