use reqwest::header::{HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use super::error::ClientError;

/// Page envelope returned by `GET /pets`
#[derive(Debug, Deserialize)]
struct PetPage {
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// HTTP client for the pets API, authenticated with the static API key
pub struct PetsClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key_header: HeaderName,
    api_key: HeaderValue,
}

impl PetsClient {
    pub fn new(base_url: &str, api_key_header: &str, api_key: &str) -> Result<Self, ClientError> {
        let api_key_header = HeaderName::from_bytes(api_key_header.as_bytes())
            .map_err(|e| ClientError::InvalidApiKey(format!("{}: {}", api_key_header, e)))?;
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| ClientError::InvalidApiKey(e.to_string()))?;
        api_key.set_sensitive(true);

        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key_header,
            api_key,
        })
    }

    /// Fetch every pet in one page. `None` applies no photo filter.
    pub async fn fetch_pets(&self, has_photos: Option<bool>) -> Result<Vec<Value>, ClientError> {
        let url = format!("{}/pets", self.base_url);

        let mut query: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(has_photos) = has_photos {
            query.push(("has_photos", if has_photos { "True" } else { "False" }.to_string()));
        }
        query.push(("limit", i64::MAX.to_string()));

        tracing::debug!("Fetching pets from {} (has_photos={:?})", url, has_photos);

        let response = self
            .http_client
            .get(&url)
            .header(self.api_key_header.clone(), self.api_key.clone())
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("Request to {} failed: {}", url, e);
                ClientError::Unavailable(e)
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .map(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("Server responded with {}", status));
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                message,
            });
        }

        let page = response
            .json::<PetPage>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        tracing::debug!("Fetched {} pets", page.data.len());
        Ok(page.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fetch_and_render;
    use crate::shared::test_helpers::{seed_pets, test_context, TestContext, TEST_API_KEY};

    async fn serve(ctx: &TestContext) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = ctx.router();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_all_and_filtered() {
        let ctx = test_context().await;
        seed_pets(&ctx, 2, 3).await;
        let base_url = serve(&ctx).await;
        let client = PetsClient::new(&base_url, "X-API-KEY", TEST_API_KEY).unwrap();

        assert_eq!(client.fetch_pets(None).await.unwrap().len(), 5);
        assert_eq!(client.fetch_pets(Some(true)).await.unwrap().len(), 2);
        assert_eq!(client.fetch_pets(Some(false)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_and_render_flattens_photos() {
        let ctx = test_context().await;
        seed_pets(&ctx, 1, 0).await;
        let base_url = serve(&ctx).await;
        let client = PetsClient::new(&base_url, "x-api-key", TEST_API_KEY).unwrap();

        let output = fetch_and_render(&client, Some(true)).await.unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        let photos = value["pets"][0]["photos"].as_array().unwrap();
        assert_eq!(photos.len(), 1);
        assert!(photos[0].as_str().unwrap().contains("/media/images/"));
        assert!(output.contains("\n    \"pets\": ["));
    }

    #[tokio::test]
    async fn test_wrong_key_is_unauthorized() {
        let ctx = test_context().await;
        let base_url = serve(&ctx).await;
        let client = PetsClient::new(&base_url, "X-API-KEY", "wrong").unwrap();

        let err = client.fetch_pets(None).await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
        assert_eq!(err.to_string(), "API KEY is not valid");
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = PetsClient::new(&format!("http://{}", addr), "X-API-KEY", "k").unwrap();
        let err = client.fetch_pets(None).await.unwrap_err();
        assert!(matches!(err, ClientError::Unavailable(_)));
        assert_eq!(err.to_string(), "ERROR: Server is not available");
    }

    #[test]
    fn test_rejects_unusable_header_name() {
        assert!(matches!(
            PetsClient::new("http://localhost", "bad header", "k"),
            Err(ClientError::InvalidApiKey(_))
        ));
    }
}
