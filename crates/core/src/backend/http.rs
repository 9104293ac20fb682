use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode, Url};
use std::time::Duration;

use super::traits::StockBackend;
use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingInput};

/// REST client for the holdings backend.
///
/// - `GET /stocks`, `GET /stocks/{id}`
/// - `POST /stocks`, `PUT /stocks/{id}` with a JSON `HoldingInput` body
/// - `DELETE /stocks/{id}`
///
/// 404 maps to `CoreError::NotFound`; any other non-success status maps to
/// `CoreError::Backend` carrying the status and response body.
pub struct HttpStockBackend {
    client: Client,
    base_url: String,
}

impl HttpStockBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Base URL with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/stocks", self.base_url)
    }

    /// `{base}/stocks/{id}` with the id percent-encoded as one path segment.
    /// An empty id never names a record, so it is reported as not found
    /// without a request.
    fn item_url(&self, id: &str) -> Result<Url, CoreError> {
        if id.is_empty() {
            return Err(CoreError::NotFound(id.to_string()));
        }
        let invalid = || CoreError::Config(format!("Invalid backend URL: {}", self.base_url));
        let mut url = Url::parse(&self.collection_url()).map_err(|_| invalid())?;
        url.path_segments_mut().map_err(|_| invalid())?.push(id);
        Ok(url)
    }

    /// Turn a non-success response into the matching error.
    async fn check(response: Response, id: Option<&str>) -> Result<Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(CoreError::NotFound(id.to_string()));
            }
        }
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unexpected response")
                .to_string()
        } else {
            body
        };
        Err(CoreError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    fn encode(input: &HoldingInput) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(input).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    async fn parse_holding(response: Response) -> Result<Holding, CoreError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl StockBackend for HttpStockBackend {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn list(&self) -> Result<Vec<Holding>, CoreError> {
        let url = self.collection_url();
        debug!("GET {url}");
        let response = self.client.get(&url).send().await?;
        let response = Self::check(response, None).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get(&self, id: &str) -> Result<Holding, CoreError> {
        let url = self.item_url(id)?;
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let response = Self::check(response, Some(id)).await?;
        Self::parse_holding(response).await
    }

    async fn create(&self, input: &HoldingInput) -> Result<Holding, CoreError> {
        let url = self.collection_url();
        debug!("POST {url} ({})", input.ticker);
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(Self::encode(input)?)
            .send()
            .await?;
        let response = Self::check(response, None).await?;
        Self::parse_holding(response).await
    }

    async fn update(&self, id: &str, input: &HoldingInput) -> Result<Holding, CoreError> {
        let url = self.item_url(id)?;
        debug!("PUT {url} ({})", input.ticker);
        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json")
            .body(Self::encode(input)?)
            .send()
            .await?;
        let response = Self::check(response, Some(id)).await?;
        Self::parse_holding(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        let url = self.item_url(id)?;
        debug!("DELETE {url}");
        let response = self.client.delete(url).send().await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }
}
