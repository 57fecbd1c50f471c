//! Per-transfer byte accounting.

use std::sync::Arc;

use crate::observe::{RelayEvent, RelayObserver, RequestPhase};

/// Status of one relay transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    /// Bytes are flowing.
    Streaming,
    /// Upstream ended cleanly.
    Completed,
    /// Upstream errored.
    Failed,
    /// The body was dropped before upstream ended.
    Aborted,
}

/// Progress of one relay transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferState {
    /// Bytes forwarded so far.
    pub bytes_transferred: u64,
    /// Declared total, when the origin sent a usable `content-length`.
    pub total_bytes: Option<u64>,
    /// Current status.
    pub status: TransferStatus,
}

impl TransferState {
    /// Creates a fresh streaming state.
    #[must_use]
    pub fn new(total_bytes: Option<u64>) -> Self {
        Self {
            bytes_transferred: 0,
            total_bytes,
            status: TransferStatus::Streaming,
        }
    }

    /// Completion percentage, rounded; `None` when the total is unknown.
    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        let total = self.total_bytes.filter(|total| *total > 0)?;
        let percent = self
            .bytes_transferred
            .saturating_mul(100)
            .saturating_add(total / 2)
            / total;
        Some(u8::try_from(percent.min(100)).unwrap_or(100))
    }
}

/// Owns the [`TransferState`] for a body stream and reports every change.
///
/// Dropping a tracker that is still streaming means the caller went away.
pub(crate) struct TransferTracker {
    state: TransferState,
    observer: Arc<dyn RelayObserver>,
}

impl TransferTracker {
    pub(crate) fn new(total_bytes: Option<u64>, observer: Arc<dyn RelayObserver>) -> Self {
        Self {
            state: TransferState::new(total_bytes),
            observer,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.state.status != TransferStatus::Streaming
    }

    pub(crate) fn record(&mut self, chunk_len: usize) {
        self.state.bytes_transferred = self
            .state
            .bytes_transferred
            .saturating_add(u64::try_from(chunk_len).unwrap_or(u64::MAX));
        self.observer
            .on_event(&RelayEvent::TransferProgress(self.state.clone()));
    }

    pub(crate) fn complete(&mut self) {
        self.state.status = TransferStatus::Completed;
        self.observer.on_event(&RelayEvent::TransferCompleted {
            bytes_transferred: self.state.bytes_transferred,
        });
        self.finish_phase(RequestPhase::Completed);
    }

    pub(crate) fn fail(&mut self, reason: &str) {
        self.state.status = TransferStatus::Failed;
        self.observer.on_event(&RelayEvent::TransferFailed {
            bytes_transferred: self.state.bytes_transferred,
            reason: reason.to_string(),
        });
        self.finish_phase(RequestPhase::Failed);
    }

    fn finish_phase(&self, to: RequestPhase) {
        self.observer.on_event(&RelayEvent::PhaseChanged {
            from: RequestPhase::Streaming,
            to,
        });
    }
}

impl Drop for TransferTracker {
    fn drop(&mut self) {
        if self.is_finished() {
            return;
        }
        self.state.status = TransferStatus::Aborted;
        self.observer.on_event(&RelayEvent::TransferAborted {
            bytes_transferred: self.state.bytes_transferred,
        });
        self.finish_phase(RequestPhase::Failed);
    }
}
