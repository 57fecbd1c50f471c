//! Provider backed by the platform's own feed API.
//!
//! The numeric video id is taken from the `/video/<id>` path segment and
//! looked up on the feed endpoint. The play address lives several levels deep
//! in the response, and any missing level is an ordinary provider failure.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, ORIGIN, REFERER};
use serde_json::Value;

use crate::normalize::NormalizedUrl;

use super::http_client::{ProviderHttpConfig, build_provider_http_client};
use super::{MediaReference, Provider, ProviderError};

const PROVIDER_NAME: &str = "tiktok-api";
const DEFAULT_FEED_URL: &str = "https://api16-normal-c-useast1a.tiktokv.com/aweme/v1/feed/";
const PAGE_ORIGIN: &str = "https://www.tiktok.com";
const PAGE_REFERER: &str = "https://www.tiktok.com/";
const VIDEO_PATH_MARKER: &str = "/video/";
const PLAY_URL_POINTER: &str = "/aweme_list/0/video/play_addr/url_list/0";

/// Resolves videos through the platform feed endpoint.
pub struct TikTokApiProvider {
    client: Client,
    feed_url: String,
}

impl TikTokApiProvider {
    /// Creates a provider pointed at the public feed endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when HTTP client construction fails.
    pub fn new(config: &ProviderHttpConfig) -> Result<Self, ProviderError> {
        Self::with_feed_url(config, DEFAULT_FEED_URL)
    }

    /// Creates a provider with a custom feed endpoint for tests.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when HTTP client construction fails.
    pub fn with_feed_url(
        config: &ProviderHttpConfig,
        feed_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_provider_http_client(PROVIDER_NAME, config)?,
            feed_url: feed_url.into(),
        })
    }
}

impl std::fmt::Debug for TikTokApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TikTokApiProvider")
            .field("feed_url", &self.feed_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for TikTokApiProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[tracing::instrument(skip(self), fields(provider = PROVIDER_NAME))]
    async fn resolve(&self, url: &NormalizedUrl) -> Result<MediaReference, ProviderError> {
        let Some(video_id) = extract_video_id(url.as_str()) else {
            return Err(ProviderError::invalid_input(
                PROVIDER_NAME,
                url.as_str(),
                "no numeric video id after /video/",
            ));
        };

        let response = self
            .client
            .get(&self.feed_url)
            .query(&[("aweme_id", video_id)])
            .header(ACCEPT, "application/json")
            .header(ORIGIN, PAGE_ORIGIN)
            .header(REFERER, PAGE_REFERER)
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

        extract_play_url(&body)
            .map(MediaReference::new)
            .ok_or_else(|| {
                ProviderError::missing_field(
                    PROVIDER_NAME,
                    "aweme_list[0].video.play_addr.url_list[0]",
                )
            })
    }
}

/// Returns the numeric id in the path segment after `/video/`.
fn extract_video_id(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once(VIDEO_PATH_MARKER)?;
    let id = rest.split('/').next().unwrap_or_default();
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then_some(id)
}

fn extract_play_url(body: &Value) -> Option<&str> {
    body.pointer(PLAY_URL_POINTER)
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}
