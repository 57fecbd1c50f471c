//! tikrelay library
//!
//! Turns a TikTok share URL into a direct video download. A request is
//! normalized, resolved through an ordered chain of third-party providers,
//! and the resulting media is streamed back to the caller without buffering.
//!
//! # Architecture
//!
//! - [`normalize`] - Canonical form of caller-supplied URLs
//! - [`provider`] - Resolution providers and the fallback chain
//! - [`relay`] - Validated, streaming fetch of the resolved media
//! - [`pipeline`] - Per-request state machine tying the stages together
//! - [`observe`] - Injectable event hook used for logging and tests
//! - [`server`] - axum router exposing `GET /download`

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod normalize;
pub mod observe;
pub mod pipeline;
pub mod provider;
pub mod relay;
pub mod server;

mod user_agent;

// Re-export commonly used types
pub use normalize::{NormalizeError, NormalizedUrl, normalize};
pub use observe::{RecordingObserver, RelayEvent, RelayObserver, RequestPhase, TracingObserver};
pub use pipeline::{DownloadPipeline, PipelineError};
pub use provider::{
    MediaReference, Provider, ProviderChain, ProviderError, ProviderHttpConfig, ResolveError,
    build_default_provider_chain,
};
pub use relay::{Relay, RelayConfig, RelayDownload, RelayError};
pub use server::{AppState, router, serve};
