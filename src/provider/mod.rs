//! Resolution providers and the ordered fallback chain.
//!
//! A provider turns a [`NormalizedUrl`] into a [`MediaReference`] by asking
//! one third-party service. Providers never fail the request on their own:
//! the [`ProviderChain`] tries them in registration order and stops at the
//! first success.
//!
//! # Architecture
//!
//! - [`Provider`] - Async trait each upstream strategy implements
//! - [`ProviderChain`] - Ordered collection with the fallback loop
//! - [`TikTokApiProvider`] - Platform feed API (tried first)
//! - [`SavetikProvider`] - savetik.net HTML scrape (second)
//! - [`TikwmProvider`] - tikwm.com JSON API (last)
//!
//! # Example
//!
//! ```no_run
//! use tikrelay::normalize::normalize;
//! use tikrelay::observe::TracingObserver;
//! use tikrelay::provider::{ProviderHttpConfig, build_default_provider_chain};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let chain = build_default_provider_chain(&ProviderHttpConfig::default());
//! let url = normalize("https://www.tiktok.com/@scout/video/7234567890123456789")?;
//! let media = chain.resolve_any(&url, &TracingObserver).await?;
//! println!("Media URL: {}", media.url);
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;
mod registry;
mod savetik;
mod tiktok_api;
mod tikwm;

pub use error::{ProviderError, ResolveError};
pub use http_client::{DEFAULT_PROVIDER_CONNECT_TIMEOUT_SECS, ProviderHttpConfig};
pub use registry::ProviderChain;
pub use savetik::SavetikProvider;
pub use tiktok_api::TikTokApiProvider;
pub use tikwm::TikwmProvider;

use async_trait::async_trait;
use tracing::warn;

use crate::normalize::NormalizedUrl;

/// Builds the provider chain used by the server.
///
/// Order is fixed: the platform's own API first, then the free public
/// services. A provider whose client cannot be built is skipped.
#[must_use]
pub fn build_default_provider_chain(config: &ProviderHttpConfig) -> ProviderChain {
    let mut chain = ProviderChain::new();

    match TikTokApiProvider::new(config) {
        Ok(provider) => chain.register(Box::new(provider)),
        Err(error) => warn!(
            error = %error,
            "TikTok API provider unavailable; continuing with remaining providers"
        ),
    }

    match SavetikProvider::new(config) {
        Ok(provider) => chain.register(Box::new(provider)),
        Err(error) => warn!(
            error = %error,
            "savetik provider unavailable; continuing with remaining providers"
        ),
    }

    match TikwmProvider::new(config) {
        Ok(provider) => chain.register(Box::new(provider)),
        Err(error) => warn!(
            error = %error,
            "tikwm provider unavailable; chain has no final fallback"
        ),
    }

    chain
}

/// A directly fetchable media location produced by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaReference {
    /// URL of the video binary.
    pub url: String,
}

impl MediaReference {
    /// Creates a media reference.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Outcome of one provider attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The provider produced a media reference.
    Success(MediaReference),
    /// The provider failed; the reason is the rendered [`ProviderError`].
    Failure(String),
}

/// Diagnostic record of a single provider attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    /// Name of the provider that was tried.
    pub provider: String,
    /// What happened.
    pub outcome: AttemptOutcome,
}

impl ProviderAttempt {
    /// Records a successful attempt.
    #[must_use]
    pub fn success(provider: &str, media: MediaReference) -> Self {
        Self {
            provider: provider.to_string(),
            outcome: AttemptOutcome::Success(media),
        }
    }

    /// Records a failed attempt.
    #[must_use]
    pub fn failure(provider: &str, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            outcome: AttemptOutcome::Failure(reason.into()),
        }
    }

    /// Returns true if the attempt produced a media reference.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success(_))
    }
}

/// Trait every resolution provider implements.
///
/// # Object Safety
///
/// Uses `async_trait` so the chain can hold `Box<dyn Provider>`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the provider's name (e.g. "tiktok-api", "savetik", "tikwm").
    fn name(&self) -> &str;

    /// Resolves a normalized URL into a media reference.
    async fn resolve(&self, url: &NormalizedUrl) -> Result<MediaReference, ProviderError>;
}
