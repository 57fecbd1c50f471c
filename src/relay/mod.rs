//! Streaming relay from the media origin to the caller.
//!
//! [`Relay::open`] fetches a [`MediaReference`], checks that it really is a
//! video, and pulls the first body chunk before anything is committed to the
//! caller. The returned [`RelayDownload`] carries the outbound headers and a
//! body stream that counts bytes as the caller pulls them.
//!
//! # Features
//!
//! - App-style request (`Range: bytes=0-`) so origins answer with a stream
//! - Up to 5 redirects, any status in `200..400`
//! - 30s idle timeout on the response head and on each body read; no
//!   deadline on the transfer as a whole
//! - `content-type` must mention `video`
//! - Upstream failures before the first byte are reported as errors; later
//!   failures end the body early
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use futures_util::StreamExt;
//! use tikrelay::observe::TracingObserver;
//! use tikrelay::provider::MediaReference;
//! use tikrelay::relay::Relay;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let relay = Relay::new()?;
//! let media = MediaReference::new("https://v16.example.com/video.mp4");
//! let download = relay.open(&media, Arc::new(TracingObserver)).await?;
//! println!("{}", download.content_disposition());
//! let mut body = Box::pin(download.into_stream());
//! while let Some(chunk) = body.next().await {
//!     let _bytes = chunk?;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod transfer;

pub use error::RelayError;
pub use transfer::{TransferState, TransferStatus};

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, RANGE};
use reqwest::{Client, redirect};
use tracing::{debug, instrument};

use crate::observe::{RelayEvent, RelayObserver};
use crate::provider::MediaReference;
use crate::user_agent::MOBILE_APP_USER_AGENT;

use transfer::TransferTracker;

/// Default idle timeout for the media fetch (30 seconds).
pub const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 30;

/// Maximum redirect hops followed for the media fetch.
pub const MAX_REDIRECTS: usize = 5;

/// Networking knobs for the media fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// Idle timeout: bounds connect, the wait for the response head, and
    /// each body read. There is no deadline on the transfer as a whole.
    pub timeout: Duration,
    /// Redirect hops followed before failing.
    pub max_redirects: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_RELAY_TIMEOUT_SECS),
            max_redirects: MAX_REDIRECTS,
        }
    }
}

/// HTTP client that fetches resolved media for the caller.
///
/// Created once and shared by all requests; reqwest pools connections.
#[derive(Debug, Clone)]
pub struct Relay {
    client: Client,
    head_timeout: Duration,
}

impl Relay {
    /// Creates a relay with the default timeout and redirect cap.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ClientBuild`] when reqwest rejects the configuration.
    pub fn new() -> Result<Self, RelayError> {
        Self::with_config(&RelayConfig::default())
    }

    /// Creates a relay with explicit networking settings.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::ClientBuild`] when reqwest rejects the configuration.
    pub fn with_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = Client::builder()
            .user_agent(MOBILE_APP_USER_AGENT)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .connect_timeout(config.timeout)
            .read_timeout(config.timeout)
            .build()
            .map_err(|e| RelayError::client_build(e.to_string()))?;
        Ok(Self {
            client,
            head_timeout: config.timeout,
        })
    }

    /// Fetches `media` and prepares it for relaying.
    ///
    /// Nothing is exposed to the caller unless the origin answered with a
    /// status in `200..400`, a video content type, and a readable first chunk.
    ///
    /// # Errors
    ///
    /// - [`RelayError::Network`] / [`RelayError::Timeout`] when the request fails
    ///   or the response head does not arrive within the idle timeout
    /// - [`RelayError::HttpStatus`] for a status outside `200..400`
    /// - [`RelayError::InvalidContentType`] when `content-type` lacks `video`
    /// - [`RelayError::Stream`] when the first body read fails
    #[instrument(skip(self, media, observer), fields(media_url = %media.url))]
    pub async fn open(
        &self,
        media: &MediaReference,
        observer: Arc<dyn RelayObserver>,
    ) -> Result<RelayDownload, RelayError> {
        let url = media.url.as_str();
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "*/*")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(RANGE, "bytes=0-")
            .send();
        let response = tokio::time::timeout(self.head_timeout, request)
            .await
            .map_err(|_| RelayError::timeout(url))?
            .map_err(|e| RelayError::request(url, e))?;

        let status = response.status().as_u16();
        if !(200..400).contains(&status) {
            return Err(RelayError::http_status(url, status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let Some(content_type) = content_type.filter(|ct| ct.contains("video")) else {
            let received = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            debug!(content_type = ?received, "origin did not return video");
            return Err(RelayError::invalid_content_type(url, received));
        };

        let total_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|len| *len > 0);

        let mut upstream = response.bytes_stream().boxed();
        let first_chunk = match upstream.next().await {
            Some(Ok(chunk)) => Some(chunk),
            Some(Err(error)) => return Err(RelayError::stream(error)),
            None => None,
        };

        observer.on_event(&RelayEvent::TransferStarted {
            content_type: content_type.clone(),
            total_bytes,
        });
        debug!(status, total_bytes = ?total_bytes, "relay committed");

        Ok(RelayDownload {
            content_type,
            filename: download_filename(),
            total_bytes,
            first_chunk,
            upstream,
            tracker: TransferTracker::new(total_bytes, observer),
        })
    }
}

/// A validated media response ready to be forwarded.
pub struct RelayDownload {
    content_type: String,
    filename: String,
    total_bytes: Option<u64>,
    first_chunk: Option<Bytes>,
    upstream: BoxStream<'static, reqwest::Result<Bytes>>,
    tracker: TransferTracker,
}

impl RelayDownload {
    /// The origin's content type, passed through unchanged.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Attachment filename, `tiktok_video_<unix-ms>.mp4`.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// `Content-Disposition` header value for the caller.
    #[must_use]
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }

    /// Declared body length, when known.
    #[must_use]
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }

    /// Converts the download into the caller-facing body stream.
    ///
    /// The stream ends after the first upstream error. Dropping it early
    /// drops the upstream response and is reported as an aborted transfer.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, RelayError>> + Send + 'static {
        let Self {
            first_chunk,
            upstream,
            tracker,
            ..
        } = self;
        let body = stream::iter(first_chunk.map(Ok)).chain(upstream).boxed();

        stream::unfold((body, tracker), |(mut body, mut tracker)| async move {
            if tracker.is_finished() {
                return None;
            }
            match body.next().await {
                Some(Ok(chunk)) => {
                    tracker.record(chunk.len());
                    Some((Ok(chunk), (body, tracker)))
                }
                Some(Err(error)) => {
                    let error = RelayError::stream(error);
                    tracker.fail(&error_chain(&error));
                    Some((Err(error), (body, tracker)))
                }
                None => {
                    tracker.complete();
                    None
                }
            }
        })
    }
}

impl std::fmt::Debug for RelayDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayDownload")
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("total_bytes", &self.total_bytes)
            .finish_non_exhaustive()
    }
}

fn download_filename() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("tiktok_video_{millis}.mp4")
}

fn error_chain(error: &RelayError) -> String {
    match std::error::Error::source(error) {
        Some(source) => format!("{error}: {source}"),
        None => error.to_string(),
    }
}
