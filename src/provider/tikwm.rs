//! tikwm.com provider - the last fallback.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ORIGIN, REFERER};
use serde_json::Value;

use crate::normalize::NormalizedUrl;

use super::http_client::{ProviderHttpConfig, build_provider_http_client};
use super::{MediaReference, Provider, ProviderError};

const PROVIDER_NAME: &str = "tikwm";
const DEFAULT_BASE_URL: &str = "https://tikwm.com";
const API_PATH: &str = "/api/";

/// Resolves videos through tikwm's JSON API, requesting the HD rendition.
pub struct TikwmProvider {
    client: Client,
    base_url: String,
}

impl TikwmProvider {
    /// Creates a provider pointed at tikwm.com.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when HTTP client construction fails.
    pub fn new(config: &ProviderHttpConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Creates a provider with a custom base URL for tests.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when HTTP client construction fails.
    pub fn with_base_url(
        config: &ProviderHttpConfig,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_provider_http_client(PROVIDER_NAME, config)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl std::fmt::Debug for TikwmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TikwmProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for TikwmProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[tracing::instrument(skip(self), fields(provider = PROVIDER_NAME))]
    async fn resolve(&self, url: &NormalizedUrl) -> Result<MediaReference, ProviderError> {
        let response = self
            .client
            .post(format!("{}{API_PATH}", self.base_url))
            .header(ORIGIN, &self.base_url)
            .header(REFERER, format!("{}/", self.base_url))
            .form(&[("url", url.as_str()), ("hd", "1")])
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::http_status(
                PROVIDER_NAME,
                response.status().as_u16(),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER_NAME, e.to_string()))?;

        body.pointer("/data/play")
            .and_then(Value::as_str)
            .filter(|play| !play.is_empty())
            .map(MediaReference::new)
            .ok_or_else(|| ProviderError::missing_field(PROVIDER_NAME, "data.play"))
    }
}
