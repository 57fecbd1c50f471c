//! Per-request orchestration: normalize, resolve, open the relay.
//!
//! [`DownloadPipeline`] owns every long-lived piece (provider chain, relay
//! client, observer) and is shared by all requests behind an `Arc`. Each call
//! to [`DownloadPipeline::start`] walks the request through its phases and
//! reports every transition to the observer. The streaming phase finishes
//! when the returned body stream ends or is dropped.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use crate::normalize::{NormalizeError, normalize};
use crate::observe::{RelayEvent, RelayObserver, RequestPhase};
use crate::provider::{ProviderChain, ResolveError};
use crate::relay::{Relay, RelayDownload, RelayError};

/// Message shown when every provider failed.
pub const EXHAUSTED_MESSAGE: &str = "Could not get video URL. Please verify that:\n\
1. The video is public\n\
2. The video URL is correct\n\
3. The video has not been deleted";

/// Message shown when the input is not a platform URL.
pub const INVALID_URL_MESSAGE: &str = "Not a valid TikTok URL";

/// Message for failures without a specific caller-facing text.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Error downloading video. Please make sure the video URL is valid and try again.";

/// Errors that end a request before any byte reaches the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input did not normalize to a platform URL
    #[error(transparent)]
    InvalidUrl(#[from] NormalizeError),

    /// No provider produced a media reference
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// The media fetch failed before commit
    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl PipelineError {
    /// Human-readable text for the caller.
    ///
    /// Internal detail (provider errors, media URLs) stays in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidUrl(_) => INVALID_URL_MESSAGE.to_string(),
            Self::Resolution(_) => EXHAUSTED_MESSAGE.to_string(),
            Self::Relay(
                error @ (RelayError::InvalidContentType { .. } | RelayError::Stream { .. }),
            ) => error.to_string(),
            Self::Relay(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Shared, immutable request pipeline.
pub struct DownloadPipeline {
    providers: ProviderChain,
    relay: Relay,
    observer: Arc<dyn RelayObserver>,
}

impl DownloadPipeline {
    /// Assembles a pipeline from its parts.
    #[must_use]
    pub fn new(providers: ProviderChain, relay: Relay, observer: Arc<dyn RelayObserver>) -> Self {
        Self {
            providers,
            relay,
            observer,
        }
    }

    /// Names of the registered providers, in fallback order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.provider_names()
    }

    /// Runs normalization, resolution and the relay handshake for `raw_url`.
    ///
    /// On success the request is in the streaming phase and the caller owns
    /// the body.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for the first stage that failed; the request
    /// has already been reported as `Failed`.
    #[instrument(skip(self), fields(url = %raw_url))]
    pub async fn start(&self, raw_url: &str) -> Result<RelayDownload, PipelineError> {
        self.transition(RequestPhase::Idle, RequestPhase::Normalizing);
        let url = match normalize(raw_url) {
            Ok(url) => url,
            Err(error) => return Err(self.fail(RequestPhase::Normalizing, error)),
        };
        self.observer.on_event(&RelayEvent::Normalized {
            original: raw_url.to_string(),
            normalized: url.to_string(),
        });

        self.transition(RequestPhase::Normalizing, RequestPhase::Resolving);
        let media = match self
            .providers
            .resolve_any(&url, self.observer.as_ref())
            .await
        {
            Ok(media) => media,
            Err(error) => return Err(self.fail(RequestPhase::Resolving, error)),
        };

        self.transition(RequestPhase::Resolving, RequestPhase::Streaming);
        self.relay
            .open(&media, Arc::clone(&self.observer))
            .await
            .map_err(|error| self.fail(RequestPhase::Streaming, error))
    }

    fn transition(&self, from: RequestPhase, to: RequestPhase) {
        self.observer.on_event(&RelayEvent::PhaseChanged { from, to });
    }

    fn fail(&self, from: RequestPhase, error: impl Into<PipelineError>) -> PipelineError {
        self.transition(from, RequestPhase::Failed);
        error.into()
    }
}

impl std::fmt::Debug for DownloadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadPipeline")
            .field("providers", &self.providers)
            .field("relay", &self.relay)
            .finish_non_exhaustive()
    }
}
