//! Shared HTTP client construction policy for providers.
//!
//! All providers spoof the same desktop browser and share connect-timeout
//! policy. The total request timeout is off unless configured.

use std::time::Duration;

use reqwest::Client;

use crate::user_agent::DESKTOP_BROWSER_USER_AGENT;

use super::ProviderError;

/// Default connect timeout for provider requests (10 seconds).
pub const DEFAULT_PROVIDER_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Networking knobs applied to every provider client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderHttpConfig {
    /// Connect timeout for provider requests.
    pub connect_timeout: Duration,
    /// Total request timeout; `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
}

impl Default for ProviderHttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_PROVIDER_CONNECT_TIMEOUT_SECS),
            request_timeout: None,
        }
    }
}

/// Builds a provider HTTP client using the shared policy.
///
/// `provider` is used only in error messages and logs.
///
/// # Errors
///
/// Returns [`ProviderError::ClientBuild`] when reqwest rejects the configuration.
pub(crate) fn build_provider_http_client(
    provider: &str,
    config: &ProviderHttpConfig,
) -> Result<Client, ProviderError> {
    let mut builder = Client::builder()
        .connect_timeout(config.connect_timeout)
        .user_agent(DESKTOP_BROWSER_USER_AGENT)
        .gzip(true);
    if let Some(timeout) = config.request_timeout {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(|error| {
        tracing::warn!(provider, error = %error, "provider HTTP client construction failed");
        ProviderError::client_build(provider, error.to_string())
    })
}
