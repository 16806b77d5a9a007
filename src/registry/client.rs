//! HTTP client shared foundation
//!
//! Thin wrapper over reqwest with a configurable timeout and User-Agent.
//! Every failure is terminal for the lookup that caused it; there is no
//! retry logic anywhere in the client.

use crate::error::RegistryError;
use reqwest::Client;
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("depvet/", env!("CARGO_PKG_VERSION"));

/// HTTP client wrapper
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RegistryError::Client {
                message: e.to_string(),
            })?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Perform a GET request, mapping HTTP status codes to registry errors
    pub async fn get(
        &self,
        url: &str,
        package: &str,
    ) -> Result<reqwest::Response, RegistryError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RegistryError::timeout(package)
            } else {
                RegistryError::network(package, e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::package_not_found(package));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RegistryError::rate_limit(package));
        }
        if !status.is_success() {
            return Err(RegistryError::network(package, format!("HTTP {}", status)));
        }

        Ok(response)
    }

    /// Perform a GET request and parse the JSON response body
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
    ) -> Result<T, RegistryError> {
        let response = self.get(url, package).await?;
        response.json::<T>().await.map_err(|e| {
            RegistryError::invalid_response(package, format!("failed to parse JSON: {}", e))
        })
    }
}
