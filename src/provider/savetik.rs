//! savetik.net provider.
//!
//! savetik answers a form POST with an HTML fragment of download buttons. The
//! first `href` that precedes an "MP4" download label is the media URL. All
//! knowledge of that markup stays in this file.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use reqwest::header::{ORIGIN, REFERER};
use serde_json::Value;

use crate::normalize::NormalizedUrl;

use super::http_client::{ProviderHttpConfig, build_provider_http_client};
use super::{MediaReference, Provider, ProviderError};

const PROVIDER_NAME: &str = "savetik";
const DEFAULT_BASE_URL: &str = "https://savetik.net";
const DOWNLOAD_PATH: &str = "/api/ajaxDownload";

static MP4_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="([^"]+)".*?Download.*?MP4"#)
        .unwrap_or_else(|e| panic!("invalid static regex: {e}"))
});

/// Resolves videos by scraping savetik's download fragment.
pub struct SavetikProvider {
    client: Client,
    base_url: String,
}

impl SavetikProvider {
    /// Creates a provider pointed at savetik.net.
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

impl std::fmt::Debug for SavetikProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavetikProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for SavetikProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[tracing::instrument(skip(self), fields(provider = PROVIDER_NAME))]
    async fn resolve(&self, url: &NormalizedUrl) -> Result<MediaReference, ProviderError> {
        let response = self
            .client
            .post(format!("{}{DOWNLOAD_PATH}", self.base_url))
            .header("X-Requested-With", "XMLHttpRequest")
            .header(ORIGIN, &self.base_url)
            .header(REFERER, format!("{}/", self.base_url))
            .form(&[("url", url.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::http_status(
                PROVIDER_NAME,
                response.status().as_u16(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::malformed(PROVIDER_NAME, e.to_string()))?;

        let fragment = html_fragment(&body);
        extract_mp4_link(&fragment)
            .map(MediaReference::new)
            .ok_or_else(|| ProviderError::missing_field(PROVIDER_NAME, "MP4 download link"))
    }
}

/// The fragment normally arrives as the `data` string of a JSON envelope;
/// anything else is treated as raw HTML.
fn html_fragment(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get("data")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        Err(_) => body.to_string(),
    }
}

fn extract_mp4_link(html: &str) -> Option<String> {
    MP4_LINK_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
        .filter(|href| !href.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAGMENT: &str = r#"<div class="dl-action"><p><a href="https://dl.savetik.net/get?token=abc&amp;id=1" class="tik-button-dl"><i class="icon"></i> Download MP4 HD</a></p><p><a href="https://dl.savetik.net/mp3?id=1">Download MP3</a></p></div>"#;

    #[test]
    fn test_extract_mp4_link_unescapes_ampersands() {
        assert_eq!(
            extract_mp4_link(FRAGMENT).as_deref(),
            Some("https://dl.savetik.net/get?token=abc&id=1")
        );
    }

    #[test]
    fn test_extract_mp4_link_takes_first_match() {
        let html = r#"<a href="https://a/1">Download MP4</a><a href="https://b/2">Download MP4</a>"#;
        assert_eq!(extract_mp4_link(html).as_deref(), Some("https://a/1"));
    }

    #[test]
    fn test_extract_mp4_link_without_mp4_label() {
        let html = r#"<a href="https://dl.savetik.net/mp3?id=1">Download MP3</a>"#;
        assert_eq!(extract_mp4_link(html), None);
    }

    #[test]
    fn test_extract_mp4_link_does_not_cross_lines() {
        let html = "<a href=\"https://a/1\">Download\nMP4</a>";
        assert_eq!(extract_mp4_link(html), None);
    }

    #[test]
    fn test_html_fragment_reads_json_data_field() {
        let body = serde_json::json!({"status": "ok", "data": FRAGMENT}).to_string();
        assert_eq!(html_fragment(&body), FRAGMENT);
    }

    #[test]
    fn test_html_fragment_json_without_data_is_empty() {
        assert_eq!(html_fragment(r#"{"status":"error","mess":"busy"}"#), "");
    }

    #[test]
    fn test_html_fragment_falls_back_to_raw_html() {
        assert_eq!(html_fragment(FRAGMENT), FRAGMENT);
    }
}
