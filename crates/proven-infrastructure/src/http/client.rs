use proven_core::config::AppConfig;
use proven_core::error::{ProvenError, Result};
use reqwest::{Client, RequestBuilder};

/// HTTP client bound to the API base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ProvenError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(client, config.api_base_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub fn get(&self, endpoint: &str) -> RequestBuilder {
        self.client.get(self.url(endpoint))
    }

    pub fn post(&self, endpoint: &str) -> RequestBuilder {
        self.client.post(self.url(endpoint))
    }

    pub fn put(&self, endpoint: &str) -> RequestBuilder {
        self.client.put(self.url(endpoint))
    }

    pub fn delete(&self, endpoint: &str) -> RequestBuilder {
        self.client.delete(self.url(endpoint))
    }
}

/// Sends a request and returns the status with the raw body.
///
/// Only transport failures are errors here; status handling is left to the
/// envelope interpretation.
pub(crate) async fn send(request: RequestBuilder) -> Result<(u16, String)> {
    let response = request
        .send()
        .await
        .map_err(|e| ProvenError::Network(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| ProvenError::Network(e.to_string()))?;
    Ok((status, body))
}
