//! HTTP server configuration object.

use bankdash::inbound::http::session_config::SessionSettings;
use bankdash::settings::ValidatedSettings;
use std::net::SocketAddr;

/// Everything the server needs beyond the health state.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) providers: ValidatedSettings,
}

impl ServerConfig {
    /// Combine validated provider settings with session cookie settings.
    #[must_use]
    pub fn new(providers: ValidatedSettings, session: SessionSettings) -> Self {
        Self {
            bind_addr: providers.bind_addr,
            session,
            providers,
        }
    }
}
