//! Localhost availability checks for tests that need real sockets.
//!
//! Sandboxed runners sometimes forbid binding even loopback ports. Tests call
//! these helpers and return early when sockets are unusable, unless
//! `TIKRELAY_REQUIRE_SOCKET_TESTS` asks for a hard failure.

use std::net::{Ipv4Addr, TcpListener};

use wiremock::MockServer;

const REQUIRE_ENV: &str = "TIKRELAY_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    matches!(
        std::env::var(REQUIRE_ENV).as_deref().map(str::trim),
        Ok("1" | "true" | "TRUE" | "yes")
    )
}

/// Returns true when a loopback port can be bound.
///
/// # Panics
///
/// When loopback is unusable and `TIKRELAY_REQUIRE_SOCKET_TESTS` is set.
pub fn localhost_available() -> bool {
    let Err(error) = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)) else {
        return true;
    };
    assert!(
        !sockets_required(),
        "{REQUIRE_ENV} is set but loopback bind failed: {error}"
    );
    eprintln!("loopback bind failed ({error}); skipping socket-bound test");
    false
}

/// Starts a wiremock server, or `None` when loopback is unusable.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if localhost_available() {
        Some(MockServer::start().await)
    } else {
        None
    }
}
