//! Error types for URL normalization.

use thiserror::Error;

/// Errors that can occur while canonicalizing an input URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The canonicalized input does not point at the platform domain
    #[error("not a valid TikTok URL: '{url}'\n  Suggestion: {suggestion}")]
    InvalidUrl {
        /// The input after canonicalization
        url: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl NormalizeError {
    /// Creates an `InvalidUrl` error for a canonicalized input.
    #[must_use]
    pub fn invalid_url(url: &str) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            suggestion: "Copy the share link from the TikTok app or a tiktok.com video page"
                .to_string(),
        }
    }
}
