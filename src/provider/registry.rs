//! Ordered provider chain with the fallback loop.
//!
//! The [`ProviderChain`] owns the providers and tries them one after another.
//! Registration order is priority order.

use tracing::{debug, info};

use crate::normalize::NormalizedUrl;
use crate::observe::{RelayEvent, RelayObserver};

use super::{MediaReference, Provider, ProviderAttempt, ResolveError};

/// An ordered collection of providers.
///
/// Providers are awaited sequentially, never raced, so an earlier provider
/// that succeeds keeps later services from being called at all.
pub struct ProviderChain {
    providers: Vec<Box<dyn Provider>>,
}

impl ProviderChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Appends a provider; it will be tried after every provider already registered.
    #[tracing::instrument(skip(self, provider), fields(provider_name))]
    pub fn register(&mut self, provider: Box<dyn Provider>) {
        tracing::Span::current().record("provider_name", provider.name());
        debug!(
            name = provider.name(),
            position = self.providers.len(),
            "Registering provider"
        );
        self.providers.push(provider);
    }

    /// Returns the number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if no providers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Returns provider names in the order they are tried.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolves `url` with the first provider that succeeds.
    ///
    /// Every attempt, successful or not, is reported to `observer` as a
    /// [`RelayEvent::ProviderAttempted`]. Provider errors are never returned
    /// directly; they only move the loop on to the next provider.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Exhausted`] when every provider failed or the
    /// chain is empty.
    #[tracing::instrument(skip(self, url, observer), fields(url = %url))]
    pub async fn resolve_any(
        &self,
        url: &NormalizedUrl,
        observer: &dyn RelayObserver,
    ) -> Result<MediaReference, ResolveError> {
        let mut tried = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            tried.push(provider.name().to_string());
            debug!(provider = provider.name(), "Trying provider");

            match provider.resolve(url).await {
                Ok(media) => {
                    info!(
                        provider = provider.name(),
                        media_url = %media.url,
                        "Resolution successful"
                    );
                    observer.on_event(&RelayEvent::ProviderAttempted(ProviderAttempt::success(
                        provider.name(),
                        media.clone(),
                    )));
                    return Ok(media);
                }
                Err(error) => {
                    debug!(
                        provider = provider.name(),
                        error = %error,
                        "Provider failed, trying next"
                    );
                    observer.on_event(&RelayEvent::ProviderAttempted(ProviderAttempt::failure(
                        provider.name(),
                        error.to_string(),
                    )));
                }
            }
        }

        Err(ResolveError::exhausted(url.as_str(), tried))
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("provider_count", &self.providers.len())
            .field("providers", &self.provider_names())
            .finish()
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}
