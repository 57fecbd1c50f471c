//! Shared User-Agent strings for provider and relay HTTP clients.
//!
//! Providers present themselves as a desktop browser visiting the provider's
//! page; the media CDN is fetched the way the mobile app fetches it.

/// Desktop browser User-Agent sent to every resolution provider.
pub(crate) const DESKTOP_BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Mobile-app User-Agent sent to the media origin by the relay.
pub(crate) const MOBILE_APP_USER_AGENT: &str =
    "TikTok 26.2.0 rv:262018 (iPhone; iOS 14.4.2; en_US) Cronet";
