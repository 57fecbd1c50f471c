//! Injectable observability hook for the download pipeline.
//!
//! The pipeline never logs request progress directly. It emits
//! [`RelayEvent`]s to a [`RelayObserver`]; the server installs
//! [`TracingObserver`], tests install [`RecordingObserver`] and assert on the
//! captured events.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::provider::{AttemptOutcome, ProviderAttempt};
use crate::relay::TransferState;

/// Lifecycle of a single download request.
///
/// `Idle -> Normalizing -> Resolving -> Streaming -> {Completed | Failed}`;
/// `Failed` is reachable from every non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    /// Request accepted, nothing done yet.
    Idle,
    /// Canonicalizing the input URL.
    Normalizing,
    /// Walking the provider chain.
    Resolving,
    /// Relaying media bytes.
    Streaming,
    /// Body fully delivered.
    Completed,
    /// Request ended with an error.
    Failed,
}

impl RequestPhase {
    /// Returns true for `Completed` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Structured events emitted while serving one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// The request moved between phases.
    PhaseChanged {
        /// Phase being left.
        from: RequestPhase,
        /// Phase being entered.
        to: RequestPhase,
    },
    /// The caller's URL was canonicalized.
    Normalized {
        /// URL as supplied by the caller.
        original: String,
        /// Canonical form.
        normalized: String,
    },
    /// One provider was tried.
    ProviderAttempted(ProviderAttempt),
    /// The media origin answered with an acceptable video response.
    TransferStarted {
        /// Content type passed through to the caller.
        content_type: String,
        /// Declared length, when the origin sent one.
        total_bytes: Option<u64>,
    },
    /// A chunk was forwarded to the caller.
    TransferProgress(TransferState),
    /// The body was delivered in full.
    TransferCompleted {
        /// Bytes forwarded.
        bytes_transferred: u64,
    },
    /// The upstream stream failed.
    TransferFailed {
        /// Bytes forwarded before the failure.
        bytes_transferred: u64,
        /// Rendered error.
        reason: String,
    },
    /// The caller went away before the body finished.
    TransferAborted {
        /// Bytes forwarded before the body was dropped.
        bytes_transferred: u64,
    },
}

/// Receiver for pipeline events.
///
/// Implementations are shared across concurrent requests and must not block.
pub trait RelayObserver: Send + Sync {
    /// Called once per event, in emission order for a given request.
    fn on_event(&self, event: &RelayEvent);
}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RelayObserver for TracingObserver {
    fn on_event(&self, event: &RelayEvent) {
        match event {
            RelayEvent::PhaseChanged { from, to } => {
                debug!(from = ?from, to = ?to, "Request phase changed");
            }
            RelayEvent::Normalized {
                original,
                normalized,
            } => info!(original = %original, normalized = %normalized, "Normalized URL"),
            RelayEvent::ProviderAttempted(attempt) => match &attempt.outcome {
                AttemptOutcome::Success(media) => info!(
                    provider = %attempt.provider,
                    media_url = %media.url,
                    "Provider resolved media URL"
                ),
                AttemptOutcome::Failure(reason) => warn!(
                    provider = %attempt.provider,
                    reason = %reason,
                    "Provider failed, trying next"
                ),
            },
            RelayEvent::TransferStarted {
                content_type,
                total_bytes,
            } => info!(content_type = %content_type, total_bytes = ?total_bytes, "Relay started"),
            RelayEvent::TransferProgress(state) => debug!(
                bytes = state.bytes_transferred,
                total_bytes = ?state.total_bytes,
                percent = ?state.percent(),
                "Download progress"
            ),
            RelayEvent::TransferCompleted { bytes_transferred } => {
                info!(bytes = bytes_transferred, "Download completed successfully");
            }
            RelayEvent::TransferFailed {
                bytes_transferred,
                reason,
            } => warn!(bytes = bytes_transferred, reason = %reason, "Stream error"),
            RelayEvent::TransferAborted { bytes_transferred } => {
                warn!(bytes = bytes_transferred, "Caller disconnected before transfer finished");
            }
        }
    }
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RelayEvent>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<RelayEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the recorded provider attempts in order.
    #[must_use]
    pub fn provider_attempts(&self) -> Vec<ProviderAttempt> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RelayEvent::ProviderAttempted(attempt) => Some(attempt),
                _ => None,
            })
            .collect()
    }

    /// Returns the phases entered, starting from the first transition.
    #[must_use]
    pub fn phases(&self) -> Vec<RequestPhase> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RelayEvent::PhaseChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }
}

impl RelayObserver for RecordingObserver {
    fn on_event(&self, event: &RelayEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MediaReference;

    #[test]
    fn test_request_phase_terminal() {
        assert!(RequestPhase::Completed.is_terminal());
        assert!(RequestPhase::Failed.is_terminal());
        assert!(!RequestPhase::Streaming.is_terminal());
        assert!(!RequestPhase::Idle.is_terminal());
    }

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.on_event(&RelayEvent::PhaseChanged {
            from: RequestPhase::Idle,
            to: RequestPhase::Normalizing,
        });
        observer.on_event(&RelayEvent::ProviderAttempted(ProviderAttempt::failure(
            "a", "boom",
        )));
        observer.on_event(&RelayEvent::ProviderAttempted(ProviderAttempt::success(
            "b",
            MediaReference::new("https://cdn/v.mp4"),
        )));

        assert_eq!(observer.events().len(), 3);
        assert_eq!(observer.phases(), [RequestPhase::Normalizing]);
        let attempts = observer.provider_attempts();
        assert_eq!(attempts[0].provider, "a");
        assert_eq!(attempts[1].provider, "b");
    }

    #[test]
    fn test_tracing_observer_handles_every_event() {
        let observer = TracingObserver;
        let events = [
            RelayEvent::Normalized {
                original: "o".into(),
                normalized: "n".into(),
            },
            RelayEvent::TransferStarted {
                content_type: "video/mp4".into(),
                total_bytes: None,
            },
            RelayEvent::TransferProgress(TransferState::new(Some(10))),
            RelayEvent::TransferCompleted {
                bytes_transferred: 10,
            },
            RelayEvent::TransferFailed {
                bytes_transferred: 0,
                reason: "x".into(),
            },
            RelayEvent::TransferAborted {
                bytes_transferred: 3,
            },
        ];
        for event in &events {
            observer.on_event(event);
        }
    }
}
