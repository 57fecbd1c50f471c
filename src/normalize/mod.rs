//! Canonicalization of caller-supplied TikTok URLs.
//!
//! Every URL goes through [`normalize`] before any provider sees it. The
//! transformation is fixed and total:
//!
//! 1. Drop everything from the first `?` (query string).
//! 2. Drop trailing `/` characters.
//! 3. Rewrite the mobile short hosts (`vm.tiktok.com`, `vt.tiktok.com`) to
//!    the canonical web host.
//! 4. Reject anything that does not mention `tiktok.com`.
//!
//! # Example
//!
//! ```
//! use tikrelay::normalize::normalize;
//!
//! let url = normalize("https://vm.tiktok.com/ZMabc123/?is_from_webapp=1").unwrap();
//! assert_eq!(url.as_str(), "https://www.tiktok.com/ZMabc123");
//! ```

mod error;

pub use error::NormalizeError;

use std::fmt;

/// Host every normalized URL uses.
pub const CANONICAL_HOST: &str = "www.tiktok.com";

/// Domain substring a URL must carry to be accepted.
pub const PLATFORM_DOMAIN: &str = "tiktok.com";

/// Share-link hosts used by the mobile apps.
const MOBILE_SHORT_HOSTS: [&str; 2] = ["vm.tiktok.com", "vt.tiktok.com"];

/// A URL that has passed [`normalize`].
///
/// Holds no query string, no trailing slash, the canonical host, and the
/// platform domain. Re-normalizing the inner string yields an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Returns the normalized URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the value and returns the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes `raw` into a [`NormalizedUrl`].
///
/// # Errors
///
/// Returns [`NormalizeError::InvalidUrl`] when the result does not contain
/// the platform domain.
pub fn normalize(raw: &str) -> Result<NormalizedUrl, NormalizeError> {
    let without_query = raw.split_once('?').map_or(raw, |(head, _)| head);
    let trimmed = without_query.trim_end_matches('/');

    let mut url = trimmed.to_string();
    for host in MOBILE_SHORT_HOSTS {
        if url.contains(host) {
            url = url.replace(host, CANONICAL_HOST);
        }
    }

    if !url.contains(PLATFORM_DOMAIN) {
        return Err(NormalizeError::invalid_url(&url));
    }

    Ok(NormalizedUrl(url))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_query_string() {
        let url = normalize("https://www.tiktok.com/@a/video/123?x=1").unwrap();
        assert_eq!(url.as_str(), "https://www.tiktok.com/@a/video/123");
    }

    #[test]
    fn test_normalize_truncates_at_first_question_mark() {
        let url = normalize("https://www.tiktok.com/@a/video/1?x=1?y=2").unwrap();
        assert_eq!(url.as_str(), "https://www.tiktok.com/@a/video/1");
    }

    #[test]
    fn test_normalize_rewrites_vm_short_host() {
        let url = normalize("https://vm.tiktok.com/ABC/").unwrap();
        assert_eq!(url.as_str(), "https://www.tiktok.com/ABC");
    }

    #[test]
    fn test_normalize_rewrites_vt_short_host() {
        let url = normalize("https://vt.tiktok.com/ZS8xyz").unwrap();
        assert_eq!(url.as_str(), "https://www.tiktok.com/ZS8xyz");
    }

    #[test]
    fn test_normalize_rejects_other_domains() {
        let err = normalize("https://example.com/x").unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidUrl { .. }));
    }

    #[test]
    fn test_normalize_rejects_empty_input() {
        assert!(normalize("").is_err());
    }

    #[test]
    fn test_normalize_rejects_domain_only_in_query() {
        // The query is discarded before validation.
        assert!(normalize("https://example.com/?ref=tiktok.com").is_err());
    }

    #[test]
    fn test_normalize_keeps_canonical_url_untouched() {
        let input = "https://www.tiktok.com/@user.name/video/7234567890123456789";
        assert_eq!(normalize(input).unwrap().as_str(), input);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "https://www.tiktok.com/@a/video/123?x=1",
            "https://vm.tiktok.com/ABC/",
            "https://vt.tiktok.com/ABC//",
            "https://m.tiktok.com/v/123.html?u=1",
            "tiktok.com/@a/video/9/",
        ];
        for input in inputs {
            let once = normalize(input).unwrap();
            let twice = normalize(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }

    #[test]
    fn test_normalized_url_display_matches_as_str() {
        let url = normalize("https://www.tiktok.com/@a/video/1").unwrap();
        assert_eq!(url.to_string(), url.as_str());
        assert_eq!(url.clone().into_string(), "https://www.tiktok.com/@a/video/1");
    }
}
