//! Error types for the media relay.

use thiserror::Error;

/// Errors that can occur while fetching and forwarding media.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The relay HTTP client could not be constructed
    #[error("relay HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Why construction failed
        reason: String,
    },

    /// Network-level failure (DNS, connect, TLS, redirect limit)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The media URL
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The media origin went idle for longer than the relay timeout
    #[error("timeout fetching {url}")]
    Timeout {
        /// The media URL
        url: String,
    },

    /// The media origin answered outside `200..400`
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The media URL
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// The media origin did not return a video payload
    #[error("Invalid content type received")]
    InvalidContentType {
        /// The media URL
        url: String,
        /// The `content-type` header, if any
        content_type: Option<String>,
    },

    /// The upstream body failed while being read
    #[error("Error during video streaming")]
    Stream {
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },
}

impl RelayError {
    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(reason: impl Into<String>) -> Self {
        Self::ClientBuild {
            reason: reason.into(),
        }
    }

    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout(url: &str) -> Self {
        Self::Timeout {
            url: url.to_string(),
        }
    }

    /// Maps a send failure to `Timeout` or `Network`.
    #[must_use]
    pub fn request(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::Network {
                url: url.to_string(),
                source,
            }
        }
    }

    /// Creates an `HttpStatus` error.
    #[must_use]
    pub fn http_status(url: &str, status: u16) -> Self {
        Self::HttpStatus {
            url: url.to_string(),
            status,
        }
    }

    /// Creates an `InvalidContentType` error.
    #[must_use]
    pub fn invalid_content_type(url: &str, content_type: Option<&str>) -> Self {
        Self::InvalidContentType {
            url: url.to_string(),
            content_type: content_type.map(str::to_string),
        }
    }

    /// Creates a `Stream` error.
    #[must_use]
    pub fn stream(source: reqwest::Error) -> Self {
        Self::Stream { source }
    }
}
