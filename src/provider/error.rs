//! Error types for provider resolution.
//!
//! [`ProviderError`] describes why a single provider could not produce a
//! media reference; the chain swallows it and moves on. [`ResolveError`] is
//! what the chain itself returns once every provider has been tried.

use thiserror::Error;

/// Errors a single provider can hit while resolving a URL.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider's HTTP client could not be constructed
    #[error("{provider}: HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Provider name
        provider: String,
        /// Why construction failed
        reason: String,
    },

    /// The input URL lacks something the provider needs
    #[error("{provider}: unusable input '{input}': {reason}")]
    InvalidInput {
        /// Provider name
        provider: String,
        /// The normalized URL given to the provider
        input: String,
        /// What is missing
        reason: String,
    },

    /// Network-level failure talking to the upstream service
    #[error("{provider}: request failed: {source}")]
    Network {
        /// Provider name
        provider: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-2xx status
    #[error("{provider}: upstream returned HTTP {status}")]
    HttpStatus {
        /// Provider name
        provider: String,
        /// The HTTP status code
        status: u16,
    },

    /// Upstream body could not be read or parsed
    #[error("{provider}: malformed response: {reason}")]
    MalformedResponse {
        /// Provider name
        provider: String,
        /// What went wrong while reading the body
        reason: String,
    },

    /// The expected field is absent from an otherwise valid response
    #[error("{provider}: response has no '{field}'")]
    MissingField {
        /// Provider name
        provider: String,
        /// Path of the missing field
        field: &'static str,
    },
}

impl ProviderError {
    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(provider: &str, reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidInput` error.
    #[must_use]
    pub fn invalid_input(provider: &str, input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            provider: provider.to_string(),
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a `Network` error from a reqwest error.
    #[must_use]
    pub fn network(provider: &str, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.to_string(),
            source,
        }
    }

    /// Creates an `HttpStatus` error.
    #[must_use]
    pub fn http_status(provider: &str, status: u16) -> Self {
        Self::HttpStatus {
            provider: provider.to_string(),
            status,
        }
    }

    /// Creates a `MalformedResponse` error.
    #[must_use]
    pub fn malformed(provider: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates a `MissingField` error.
    #[must_use]
    pub fn missing_field(provider: &str, field: &'static str) -> Self {
        Self::MissingField {
            provider: provider.to_string(),
            field,
        }
    }
}

/// Errors returned by [`ProviderChain::resolve_any`](super::ProviderChain::resolve_any).
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// Every registered provider failed
    #[error(
        "all providers failed for '{input}': tried {tried_count} provider(s)\n  Suggestion: Check that the video is public, the URL is correct, and the video has not been deleted"
    )]
    Exhausted {
        /// The normalized URL that could not be resolved
        input: String,
        /// Number of providers that were tried
        tried_count: usize,
        /// Names of the providers in the order they were tried
        providers: Vec<String>,
    },
}

impl ResolveError {
    /// Creates an `Exhausted` error from the names of the tried providers.
    #[must_use]
    pub fn exhausted(input: &str, providers: Vec<String>) -> Self {
        Self::Exhausted {
            input: input.to_string(),
            tried_count: providers.len(),
            providers,
        }
    }
}
