//! CLI argument definitions using clap derive macros.

use std::net::IpAddr;
use std::time::Duration;

use clap::Parser;

use tikrelay::provider::{DEFAULT_PROVIDER_CONNECT_TIMEOUT_SECS, ProviderHttpConfig};
use tikrelay::relay::{DEFAULT_RELAY_TIMEOUT_SECS, RelayConfig};

/// Serve TikTok videos as direct downloads.
///
/// tikrelay resolves a TikTok URL through several public services and streams
/// the video back on `GET /download?url=<tiktok-url>`.
#[derive(Parser, Debug)]
#[command(name = "tikrelay")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3001)]
    pub port: u16,

    /// Idle timeout for the media fetch in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_RELAY_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub relay_timeout_secs: u64,

    /// Connect timeout for provider requests in seconds (1-3600)
    #[arg(long, default_value_t = DEFAULT_PROVIDER_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub provider_connect_timeout_secs: u64,

    /// Total timeout for each provider request in seconds (1-3600, unset by default)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub provider_timeout_secs: Option<u64>,
}

impl Args {
    /// Provider client settings derived from the flags.
    pub fn provider_http_config(&self) -> ProviderHttpConfig {
        ProviderHttpConfig {
            connect_timeout: Duration::from_secs(self.provider_connect_timeout_secs),
            request_timeout: self.provider_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Relay client settings derived from the flags.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            timeout: Duration::from_secs(self.relay_timeout_secs),
            ..RelayConfig::default()
        }
    }
}
